mod config;
mod error;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use clap::Parser;
use hivebq_api::{HiveValue, StructField};
use hivebq_avro::AvroRowConverter;

use crate::config::ConvertConfig;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "hivebq-convert", about = "Convert BigQuery Avro rows to Hive values")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "hivebq.toml", env = "HIVEBQ_CONFIG")]
    config: String,

    /// Avro object container file to read.
    input: String,

    /// Stop after this many rows.
    #[arg(long)]
    limit: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = run(&cli, &mut out).and_then(|rows| {
        out.flush()?;
        Ok(rows)
    });
    match result {
        Ok(rows) => tracing::info!(rows, input = %cli.input, "conversion finished"),
        Err(e) => {
            tracing::error!(error = %e, "conversion failed");
            std::process::exit(1);
        }
    }
}

/// Converts every row of `cli.input` and writes one line per row to `out`.
/// Returns the number of rows written.
fn run(cli: &Cli, out: &mut impl Write) -> Result<usize, CliError> {
    tracing::info!(config = %cli.config, "loading configuration");
    let config = ConvertConfig::load(&cli.config)?;
    let zones = config.zone_settings()?;
    let columns = config.hive_columns()?;

    let file = File::open(&cli.input)?;
    let reader = apache_avro::Reader::new(BufReader::new(file))?;
    let schema = reader.writer_schema().clone();
    let converter = AvroRowConverter::new(schema, columns, zones).map_err(CliError::Schema)?;
    tracing::debug!(input = %cli.input, columns = converter.columns().len(), "reading rows");

    let mut rows = 0;
    for (row, value) in reader.take(cli.limit.unwrap_or(usize::MAX)).enumerate() {
        let value = value?;
        let converted = converter
            .convert_record(&value)
            .map_err(|source| CliError::Convert { row, source })?;
        writeln!(out, "{}", render_row(&converted, converter.columns()))?;
        rows += 1;
    }
    Ok(rows)
}

/// Tab-separated, as the Hive CLI prints a row. Complex values render as
/// JSON with the column type's field names.
fn render_row(row: &[HiveValue], columns: &[StructField]) -> String {
    row.iter()
        .zip(columns)
        .map(|(value, column)| match value {
            HiveValue::List(_) | HiveValue::Map(_) | HiveValue::Struct(_) => {
                value.to_json(&column.field_type).to_string()
            }
            scalar => scalar.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\t")
}
