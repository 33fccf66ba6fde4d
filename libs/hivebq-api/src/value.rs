use std::fmt;

use chrono::NaiveDate;
use hivebq_temporal::{CivilTimestamp, ZonedTimestamp};

use crate::decimal::HiveDecimal;
use crate::types::HiveType;

/// Converted Hive value.
///
/// - Struct: positional, in the order of the wire schema's fields.
/// - List: one entry per wire element, order preserved.
/// - Map: decoded key/value pairs in encounter order.
#[derive(Debug, Clone, PartialEq)]
pub enum HiveValue {
    Null,
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Decimal(HiveDecimal),
    Binary(Vec<u8>),
    String(String),
    Date(NaiveDate),
    Timestamp(CivilTimestamp),
    TimestampLocalTz(ZonedTimestamp),
    List(Vec<HiveValue>),
    Map(HiveMap),
    Struct(Vec<HiveValue>),
}

/// Insertion-ordered map keyed by decoded Hive values.
///
/// Keys are arbitrary `HiveValue`s (floats included), so lookup is a linear
/// scan rather than hashing. Float keys match bit for bit: a NaN key finds
/// itself, while `0.0` and `-0.0` are distinct keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HiveMap {
    entries: Vec<(HiveValue, HiveValue)>,
}

fn same_key(a: &HiveValue, b: &HiveValue) -> bool {
    match (a, b) {
        (HiveValue::Float(x), HiveValue::Float(y)) => x.to_bits() == y.to_bits(),
        (HiveValue::Double(x), HiveValue::Double(y)) => x.to_bits() == y.to_bits(),
        (HiveValue::List(x), HiveValue::List(y)) | (HiveValue::Struct(x), HiveValue::Struct(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_key(x, y))
        }
        (HiveValue::Map(x), HiveValue::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((xk, xv), (yk, yv))| same_key(xk, yk) && same_key(xv, yv))
        }
        _ => a == b,
    }
}

impl HiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts or overwrites. An existing key keeps its position and gets
    /// the new value; the previous value is returned.
    pub fn insert(&mut self, key: HiveValue, value: HiveValue) -> Option<HiveValue> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| same_key(k, &key)) {
            Some(std::mem::replace(&mut entry.1, value))
        } else {
            self.entries.push((key, value));
            None
        }
    }

    pub fn get(&self, key: &HiveValue) -> Option<&HiveValue> {
        self.entries.iter().find(|(k, _)| same_key(k, key)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HiveValue, &HiveValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl FromIterator<(HiveValue, HiveValue)> for HiveMap {
    fn from_iter<I: IntoIterator<Item = (HiveValue, HiveValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

// ═══════════════════════════════════════════════════════════════
//  Rendering
// ═══════════════════════════════════════════════════════════════

impl HiveValue {
    /// JSON rendering as the Hive CLI prints complex values: structs as
    /// objects keyed by `ty`'s field names, maps as objects keyed by the
    /// rendered key, temporal and decimal leaves as strings.
    ///
    /// Falls back to positional rendering where `ty` does not describe the
    /// value.
    pub fn to_json(&self, ty: &HiveType) -> serde_json::Value {
        use serde_json::Value as Json;

        match (self, ty) {
            (Self::Null, _) => Json::Null,
            (Self::TinyInt(v), _) => Json::from(*v),
            (Self::SmallInt(v), _) => Json::from(*v),
            (Self::Int(v), _) => Json::from(*v),
            (Self::BigInt(v), _) => Json::from(*v),
            // Through the shortest decimal form, so 4.2f32 prints as 4.2.
            (Self::Float(v), _) => v
                .to_string()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Json::Null, Json::Number),
            (Self::Double(v), _) => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
            (Self::Boolean(v), _) => Json::Bool(*v),
            (Self::Binary(bytes), _) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
            (Self::String(s), _) => Json::String(s.clone()),
            (Self::Decimal(_) | Self::Date(_) | Self::Timestamp(_) | Self::TimestampLocalTz(_), _) => {
                Json::String(self.to_string())
            }
            (Self::List(items), HiveType::List(element)) => {
                Json::Array(items.iter().map(|item| item.to_json(element)).collect())
            }
            (Self::Map(map), HiveType::Map { key, value }) => Json::Object(
                map.iter()
                    .map(|(k, v)| (json_key(&k.to_json(key)), v.to_json(value)))
                    .collect(),
            ),
            (Self::Struct(values), HiveType::Struct(fields)) if values.len() == fields.len() => {
                Json::Object(
                    fields
                        .iter()
                        .zip(values)
                        .map(|(field, v)| (field.name.clone(), v.to_json(&field.field_type)))
                        .collect(),
                )
            }
            (Self::List(items) | Self::Struct(items), _) => {
                Json::Array(items.iter().map(|item| item.to_json(&HiveType::Void)).collect())
            }
            (Self::Map(map), _) => Json::Object(
                map.iter()
                    .map(|(k, v)| (json_key(&k.to_json(&HiveType::Void)), v.to_json(&HiveType::Void)))
                    .collect(),
            ),
        }
    }
}

fn json_key(key: &serde_json::Value) -> String {
    match key {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Hive text form: `NULL`, plain scalars, and JSON for complex values
/// (struct fields positional, since the value carries no names).
impl fmt::Display for HiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::TinyInt(v) => write!(f, "{v}"),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Binary(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::TimestampLocalTz(ts) => write!(f, "{ts}"),
            Self::List(_) | Self::Map(_) | Self::Struct(_) => {
                write!(f, "{}", self.to_json(&HiveType::Void))
            }
        }
    }
}
