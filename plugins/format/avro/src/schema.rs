use apache_avro::schema::SchemaKind;
use apache_avro::types::Value;
use apache_avro::Schema;
use hivebq_api::ConvertError;

/// A wire schema with its nullable union wrapper peeled off.
#[derive(Debug, Clone, Copy)]
pub struct SchemaInfo<'a> {
    pub actual: &'a Schema,
    pub nullable: bool,
}

/// Unwraps `["null", T]` / `[T, "null"]` into `(T, nullable)`.
///
/// A bare `null` schema is nullable; any other non-union schema is not.
/// Unions with more than one non-null branch have no Hive counterpart.
pub fn resolve(schema: &Schema) -> Result<SchemaInfo<'_>, ConvertError> {
    let Schema::Union(union) = schema else {
        return Ok(SchemaInfo {
            actual: schema,
            nullable: matches!(schema, Schema::Null),
        });
    };
    let variants = union.variants();
    let nullable = variants.iter().any(|v| matches!(v, Schema::Null));
    let mut non_null = variants.iter().filter(|v| !matches!(v, Schema::Null));
    match (non_null.next(), non_null.next()) {
        (Some(actual), None) => Ok(SchemaInfo { actual, nullable }),
        (None, _) => Ok(SchemaInfo {
            actual: variants.first().unwrap_or(schema),
            nullable: true,
        }),
        (Some(_), Some(_)) => Err(ConvertError::UnsupportedType(schema_kind(schema))),
    }
}

/// Strips union branch wrappers from a decoded value.
pub fn unwrap_union(mut value: &Value) -> &Value {
    while let Value::Union(_, inner) = value {
        value = &**inner;
    }
    value
}

/// Short name of a schema for error messages, e.g. `record Row`,
/// `decimal(38,9)`, `array`.
pub fn schema_kind(schema: &Schema) -> String {
    match schema {
        Schema::Record(record) => format!("record {}", record.name.name),
        Schema::Decimal(decimal) => format!("decimal({},{})", decimal.precision, decimal.scale),
        Schema::Ref { name } => format!("reference to {}", name.name),
        Schema::Union(union) => {
            let branches: Vec<String> = union.variants().iter().map(schema_kind).collect();
            format!("union[{}]", branches.join(","))
        }
        other => format!("{:?}", SchemaKind::from(other)).to_ascii_lowercase(),
    }
}

/// Short name of a decoded value for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Int(_) => "int",
        Value::Long(_) => "long",
        Value::Float(_) => "float",
        Value::Double(_) => "double",
        Value::Bytes(_) => "bytes",
        Value::Fixed(..) => "fixed",
        Value::String(_) => "string",
        Value::Enum(..) => "enum",
        Value::Union(..) => "union",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        Value::Record(_) => "record",
        Value::Date(_) => "date",
        Value::TimeMillis(_) => "time-millis",
        Value::TimeMicros(_) => "time-micros",
        Value::TimestampMillis(_) => "timestamp-millis",
        Value::TimestampMicros(_) => "timestamp-micros",
        Value::TimestampNanos(_) => "timestamp-nanos",
        Value::Decimal(_) => "decimal",
        Value::BigDecimal(_) => "big-decimal",
        Value::Uuid(_) => "uuid",
        Value::Duration(_) => "duration",
        Value::LocalTimestampMillis(_) => "local-timestamp-millis",
        Value::LocalTimestampMicros(_) => "local-timestamp-micros",
        Value::LocalTimestampNanos(_) => "local-timestamp-nanos",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Schema {
        Schema::parse_str(json).unwrap()
    }

    #[test]
    fn nullable_union_either_order() {
        for json in [r#"["null", "long"]"#, r#"["long", "null"]"#] {
            let schema = parse(json);
            let info = resolve(&schema).unwrap();
            assert!(info.nullable);
            assert_eq!(info.actual, &Schema::Long);
        }
    }

    #[test]
    fn plain_schema_is_not_nullable() {
        let schema = parse(r#""string""#);
        let info = resolve(&schema).unwrap();
        assert!(!info.nullable);
        assert_eq!(info.actual, &Schema::String);

        let null = parse(r#""null""#);
        assert!(resolve(&null).unwrap().nullable);
    }

    #[test]
    fn multi_branch_union_is_unsupported() {
        let schema = parse(r#"["null", "long", "string"]"#);
        assert_eq!(
            resolve(&schema).unwrap_err(),
            ConvertError::UnsupportedType("union[null,long,string]".to_string())
        );
    }

    #[test]
    fn unwraps_nested_union_values() {
        let value = Value::Union(1, Box::new(Value::Union(0, Box::new(Value::Long(7)))));
        assert_eq!(unwrap_union(&value), &Value::Long(7));
    }

    #[test]
    fn kinds_for_messages() {
        let schema = parse(r#"{"type":"bytes","logicalType":"decimal","precision":38,"scale":9}"#);
        assert_eq!(schema_kind(&schema), "decimal(38,9)");
        assert_eq!(schema_kind(&Schema::Long), "long");
        assert_eq!(value_kind(&Value::Bytes(vec![1])), "bytes");
    }
}
