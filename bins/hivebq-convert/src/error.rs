use hivebq_api::ConvertError;
use hivebq_temporal::TemporalError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("no columns configured")]
    NoColumns,

    #[error("avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("writer schema does not fit the columns: {0}")]
    Schema(ConvertError),

    #[error("row {row}: {source}")]
    Convert {
        row: usize,
        #[source]
        source: ConvertError,
    },

    #[error("zone configuration: {0}")]
    Temporal(#[from] TemporalError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Prepends `ctx` to config messages; other variants pass through.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            CliError::Config(msg) => CliError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
