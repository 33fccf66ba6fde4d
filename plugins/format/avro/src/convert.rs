use std::borrow::Cow;

use apache_avro::types::Value;
use apache_avro::Schema;
use hivebq_api::decimal::{format_unscaled, unscaled_integer_digits};
use hivebq_api::{ConvertError, HiveDecimal, HiveMap, HiveType, HiveValue, StructField};
use hivebq_temporal::{
    day_count_to_civil_date, instant_micros_to_civil_via_source_zone, instant_micros_to_zoned_utc,
    parse_civil_timestamp, retarget_zone, TemporalError, Tz, ZoneSettings, ZonedTimestamp,
};
use num_bigint::BigInt;

use crate::schema::{resolve, schema_kind, unwrap_union, value_kind};

// ═══════════════════════════════════════════════════════════════
//  Avro → Hive conversion
// ═══════════════════════════════════════════════════════════════

/// Converts an Avro value read from BigQuery into the Hive value described
/// by `target`.
///
/// `schema` is the Avro schema the value was decoded with. Dispatch is on
/// the Hive type; the value and schema must have a matching shape or the
/// conversion fails with [`ConvertError::SchemaMismatch`].
pub fn convert(
    value: &Value,
    schema: &Schema,
    target: &HiveType,
    zones: &ZoneSettings,
) -> Result<HiveValue, ConvertError> {
    let info = resolve(schema)?;
    let value = unwrap_union(value);

    if matches!(value, Value::Null) {
        return if info.nullable {
            Ok(HiveValue::Null)
        } else {
            Err(ConvertError::NonNullableNull)
        };
    }

    let actual = info.actual;
    match target {
        HiveType::List(element) => convert_list(value, actual, target, element, zones),
        HiveType::Map { key, value: map_value } => {
            convert_map(value, actual, target, key, map_value, zones)
        }
        HiveType::Struct(_) => convert_struct(value, actual, target, zones).map(HiveValue::Struct),
        HiveType::Date => {
            let days = match value {
                Value::Date(days) | Value::Int(days) => i64::from(*days),
                Value::Long(days) => *days,
                other => return Err(mismatch(target, other, actual)),
            };
            Ok(HiveValue::Date(day_count_to_civil_date(days)?))
        }
        HiveType::Timestamp => match value {
            // BigQuery DATETIME: wall clock in UTC, shown in the local zone.
            Value::String(text) => {
                let utc = parse_civil_timestamp(text)?;
                Ok(HiveValue::Timestamp(retarget_zone(&utc, Tz::UTC, zones.local())?))
            }
            // BigQuery TIMESTAMP: an absolute instant. Needs an explicit zone.
            Value::Long(micros) | Value::TimestampMicros(micros) => Ok(HiveValue::Timestamp(
                instant_micros_to_civil_via_source_zone(*micros, zones)?,
            )),
            Value::TimestampMillis(millis) => {
                let micros = millis
                    .checked_mul(1_000)
                    .ok_or_else(|| TemporalError::OutOfRange(format!("instant {millis}ms")))?;
                Ok(HiveValue::Timestamp(instant_micros_to_civil_via_source_zone(micros, zones)?))
            }
            other => Err(mismatch(target, other, actual)),
        },
        HiveType::TimestampLocalTz => match value {
            Value::Long(micros) | Value::TimestampMicros(micros) => {
                Ok(HiveValue::TimestampLocalTz(instant_micros_to_zoned_utc(*micros)?))
            }
            Value::String(text) => Ok(HiveValue::TimestampLocalTz(ZonedTimestamp::new(
                parse_civil_timestamp(text)?,
                Tz::UTC,
            ))),
            other => Err(mismatch(target, other, actual)),
        },
        // Narrowing truncates silently, like a Java primitive cast.
        HiveType::TinyInt => integral(value, actual, target).map(|v| HiveValue::TinyInt(v as i8)),
        HiveType::SmallInt => integral(value, actual, target).map(|v| HiveValue::SmallInt(v as i16)),
        HiveType::Int => integral(value, actual, target).map(|v| HiveValue::Int(v as i32)),
        HiveType::BigInt => integral(value, actual, target).map(HiveValue::BigInt),
        HiveType::Float => match value {
            Value::Double(v) => Ok(HiveValue::Float(*v as f32)),
            Value::Float(v) => Ok(HiveValue::Float(*v)),
            other => Err(mismatch(target, other, actual)),
        },
        HiveType::Double => match value {
            Value::Double(v) => Ok(HiveValue::Double(*v)),
            other => Err(mismatch(target, other, actual)),
        },
        HiveType::Boolean => match value {
            Value::Boolean(v) => Ok(HiveValue::Boolean(*v)),
            other => Err(mismatch(target, other, actual)),
        },
        HiveType::Decimal { .. } => convert_decimal(value, actual, target),
        HiveType::Binary => match value {
            Value::Bytes(bytes) | Value::Fixed(_, bytes) => Ok(HiveValue::Binary(bytes.clone())),
            other => Err(mismatch(target, other, actual)),
        },
        HiveType::String | HiveType::Varchar(_) | HiveType::Char(_) => match value {
            Value::String(s) | Value::Enum(_, s) => Ok(HiveValue::String(s.clone())),
            other => Err(mismatch(target, other, actual)),
        },
        HiveType::Void
        | HiveType::Union(_)
        | HiveType::IntervalYearMonth
        | HiveType::IntervalDayTime => Err(ConvertError::UnsupportedType(schema_kind(actual))),
    }
}

/// Converts a top-level row: every field of the record schema, in schema
/// order, against the Hive column of the same name.
pub fn convert_record(
    record: &Value,
    schema: &Schema,
    columns: &[StructField],
    zones: &ZoneSettings,
) -> Result<Vec<HiveValue>, ConvertError> {
    convert_row(record, schema, &HiveType::Struct(columns.to_vec()), zones)
}

/// [`convert_record`] against a prebuilt `struct` row type.
pub(crate) fn convert_row(
    record: &Value,
    schema: &Schema,
    row_type: &HiveType,
    zones: &ZoneSettings,
) -> Result<Vec<HiveValue>, ConvertError> {
    let info = resolve(schema)?;
    convert_struct(unwrap_union(record), info.actual, row_type, zones)
}

fn mismatch(target: &HiveType, value: &Value, schema: &Schema) -> ConvertError {
    ConvertError::mismatch(target, format!("Avro {} ({})", value_kind(value), schema_kind(schema)))
}

fn integral(value: &Value, schema: &Schema, target: &HiveType) -> Result<i64, ConvertError> {
    match value {
        Value::Long(v) => Ok(*v),
        Value::Int(v) => Ok(i64::from(*v)),
        other => Err(mismatch(target, other, schema)),
    }
}

fn convert_list(
    value: &Value,
    schema: &Schema,
    target: &HiveType,
    element: &HiveType,
    zones: &ZoneSettings,
) -> Result<HiveValue, ConvertError> {
    let (Value::Array(items), Schema::Array(array)) = (value, schema) else {
        return Err(mismatch(target, value, schema));
    };
    items
        .iter()
        .map(|item| convert(item, &array.items, element, zones))
        .collect::<Result<Vec<_>, _>>()
        .map(HiveValue::List)
}

/// BigQuery has no map type; a Hive map arrives as an array of
/// `{key, value}` records. Duplicate keys: the last one wins.
fn convert_map(
    value: &Value,
    schema: &Schema,
    target: &HiveType,
    key_type: &HiveType,
    value_type: &HiveType,
    zones: &ZoneSettings,
) -> Result<HiveValue, ConvertError> {
    match (value, schema) {
        (Value::Array(items), Schema::Array(array)) => {
            let entry_type = HiveType::key_value_struct(key_type.clone(), value_type.clone());
            let mut map = HiveMap::with_capacity(items.len());
            for item in items {
                let HiveValue::Struct(pair) = convert(item, &array.items, &entry_type, zones)? else {
                    return Err(mismatch(target, item, &array.items));
                };
                let mut pair = pair.into_iter();
                let (Some(key), Some(entry_value), None) = (pair.next(), pair.next(), pair.next())
                else {
                    return Err(mismatch(target, item, &array.items));
                };
                if map.insert(key, entry_value).is_some() {
                    tracing::debug!(hive_type = %target, "duplicate map key, keeping the last value");
                }
            }
            Ok(HiveValue::Map(map))
        }
        (Value::Map(entries), Schema::Map(map_schema)) if key_type.is_string_like() => {
            // Avro map iteration order is unspecified; sort for determinism.
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            let mut map = HiveMap::with_capacity(keys.len());
            for key in keys {
                let converted = convert(&entries[key], &map_schema.types, value_type, zones)?;
                map.insert(HiveValue::String(key.clone()), converted);
            }
            Ok(HiveValue::Map(map))
        }
        _ => Err(mismatch(target, value, schema)),
    }
}

/// Walks the record schema's fields in schema order. The record's own
/// field order and the Hive struct's field order do not matter.
fn convert_struct(
    value: &Value,
    schema: &Schema,
    target: &HiveType,
    zones: &ZoneSettings,
) -> Result<Vec<HiveValue>, ConvertError> {
    let (Value::Record(entries), Schema::Record(record)) = (value, schema) else {
        return Err(mismatch(target, value, schema));
    };
    record
        .fields
        .iter()
        .map(|field| {
            let hive_field = target.field(&field.name).ok_or_else(|| {
                ConvertError::mismatch(
                    target,
                    format!("Avro field '{}' of {}", field.name, schema_kind(schema)),
                )
            })?;
            match entries.iter().find(|(name, _)| *name == field.name) {
                Some((_, field_value)) => {
                    convert(field_value, &field.schema, &hive_field.field_type, zones)
                }
                None => convert(&Value::Null, &field.schema, &hive_field.field_type, zones),
            }
        })
        .collect()
}

/// Avro `decimal` logical type: two's-complement unscaled bytes plus the
/// schema's precision/scale.
fn convert_decimal(
    value: &Value,
    schema: &Schema,
    target: &HiveType,
) -> Result<HiveValue, ConvertError> {
    let Schema::Decimal(decimal) = schema else {
        return Err(mismatch(target, value, schema));
    };
    let bytes: Cow<'_, [u8]> = match value {
        Value::Bytes(bytes) | Value::Fixed(_, bytes) => Cow::Borrowed(bytes),
        Value::Decimal(d) => {
            let bytes: Vec<u8> = d
                .try_into()
                .map_err(|e| ConvertError::mismatch(target, format!("Avro decimal: {e}")))?;
            Cow::Owned(bytes)
        }
        other => return Err(mismatch(target, other, schema)),
    };

    let (precision, scale) = (decimal.precision, decimal.scale);
    let overflow = |value: String| ConvertError::DecimalOverflow {
        value,
        precision,
        scale,
    };
    let unscaled = BigInt::from_signed_bytes_be(&bytes);
    let wire_scale = u32::try_from(scale).unwrap_or(u32::MAX);
    let int_digits = unscaled_integer_digits(&unscaled, wire_scale) as usize;
    if int_digits > precision.saturating_sub(scale) {
        return Err(overflow(format_unscaled(&unscaled, wire_scale)));
    }
    HiveDecimal::from_unscaled(&unscaled, wire_scale)
        .map(HiveValue::Decimal)
        .ok_or_else(|| overflow(format_unscaled(&unscaled, wire_scale)))
}
