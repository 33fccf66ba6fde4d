//! Avro → Hive value conversion for rows read from BigQuery.
//!
//! [`convert`] handles one value against one Hive type. [`AvroRowConverter`]
//! binds a record schema, the Hive columns and the zone settings together
//! and converts whole rows.

pub mod convert;
pub mod schema;

use apache_avro::types::Value;
use apache_avro::Schema;
use hivebq_api::{ConvertError, HiveType, HiveValue, StructField};
use hivebq_temporal::ZoneSettings;

pub use convert::{convert, convert_record};
pub use schema::{resolve, schema_kind, SchemaInfo};

// ═══════════════════════════════════════════════════════════════
//  AvroRowConverter
// ═══════════════════════════════════════════════════════════════

/// Converts rows of one table. Immutable once built; share it by reference
/// across reader threads.
#[derive(Debug, Clone)]
pub struct AvroRowConverter {
    schema: Schema,
    /// `struct<...>` of the Hive columns.
    row_type: HiveType,
    zones: ZoneSettings,
}

impl AvroRowConverter {
    /// `schema` must be a record (possibly wrapped in a nullable union).
    pub fn new(
        schema: Schema,
        columns: Vec<StructField>,
        zones: ZoneSettings,
    ) -> Result<Self, ConvertError> {
        let info = resolve(&schema)?;
        let row_type = HiveType::Struct(columns);
        if !matches!(info.actual, Schema::Record(_)) {
            return Err(ConvertError::mismatch(
                row_type,
                format!("Avro {}", schema_kind(&schema)),
            ));
        }
        tracing::debug!(schema = %schema_kind(&schema), row_type = %row_type, "avro row converter ready");
        Ok(Self {
            schema,
            row_type,
            zones,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[StructField] {
        match &self.row_type {
            HiveType::Struct(fields) => fields,
            _ => &[],
        }
    }

    pub fn zones(&self) -> &ZoneSettings {
        &self.zones
    }

    /// One Hive value per record field, in schema order.
    pub fn convert_record(&self, record: &Value) -> Result<Vec<HiveValue>, ConvertError> {
        convert::convert_row(record, &self.schema, &self.row_type, &self.zones)
    }

    /// Decodes a single raw Avro datum (no container header) and converts it.
    pub fn decode_datum(&self, data: &[u8]) -> Result<Vec<HiveValue>, ConvertError> {
        let mut reader = data;
        let value = apache_avro::from_avro_datum(&self.schema, &mut reader, None)
            .map_err(|e| ConvertError::Decode(e.to_string()))?;
        tracing::trace!(bytes = data.len(), "decoded avro datum");
        self.convert_record(&value)
    }
}
