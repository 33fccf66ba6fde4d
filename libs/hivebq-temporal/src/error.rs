/// Failure of a temporal conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    /// A zone-less Hive timestamp had to be reinterpreted as an absolute
    /// instant, but no source zone was configured.
    #[error(
        "using timezoned values is forbidden for Hive TIMESTAMP; consider setting the `timestamp_timezone` property"
    )]
    MissingZoneConfiguration,

    #[error("malformed date-time text '{text}'")]
    MalformedTemporalText { text: String },

    #[error("unknown time zone '{0}'")]
    UnknownZone(String),

    #[error("{0} is out of the supported calendar range")]
    OutOfRange(String),
}
