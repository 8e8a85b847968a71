use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use geoextract::source::HttpOptions;
use geoextract::{ExtractOptions, ExtractRequest, Schema};

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "GEOEXTRACT_LOG";

#[derive(Parser)]
#[command(
    name = "geoextract",
    about = "Stream selected columns out of a zipped GeoNames dump into a CSV file",
    version
)]
struct Cli {
    /// Archive to read: http(s) URL, file:// URL or local path
    #[arg(required_unless_present = "list_columns")]
    url: Option<String>,

    /// CSV file to write (created or truncated)
    #[arg(required_unless_present = "list_columns")]
    dest: Option<PathBuf>,

    /// Comma-separated output columns, in output order
    #[arg(
        short,
        long,
        value_delimiter = ',',
        required_unless_present = "list_columns"
    )]
    columns: Vec<String>,

    /// Row filter, e.g. "population > 100000 && featureClass == 'P'"
    ///
    /// Cells are typed from their text: numbers, true/false, empty cells as
    /// null, anything else a string.
    /// `==` is strict, so a numeric column never equals a quoted string:
    /// write `admin1Code == 11`, not `admin1Code == "11"`.
    /// Arithmetic on an empty cell yields null, which compares false.
    /// Division by zero aborts the run.
    #[arg(short, long)]
    filter: Option<String>,

    /// Seconds to wait for the TCP/TLS connection
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 30,
        env = "GEOEXTRACT_CONNECT_TIMEOUT"
    )]
    connect_timeout: u64,

    /// Seconds to wait on any single socket read
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 300,
        env = "GEOEXTRACT_READ_TIMEOUT"
    )]
    read_timeout: u64,

    /// Print the available columns and exit
    #[arg(long)]
    list_columns: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-entry detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let schema = Schema::geonames();
    if cli.list_columns {
        for column in schema.columns() {
            println!("{}\t{}\t{}", column.index, column.name, column.description);
        }
        return Ok(());
    }

    let (Some(url), Some(destination)) = (cli.url, cli.dest) else {
        anyhow::bail!("URL and DEST are required");
    };
    let request = ExtractRequest {
        url,
        destination,
        columns: cli.columns.iter().map(|c| c.trim().to_string()).collect(),
        filter: cli.filter,
    };
    let options = ExtractOptions {
        http: HttpOptions {
            connect_timeout: Duration::from_secs(cli.connect_timeout),
            read_timeout: Duration::from_secs(cli.read_timeout),
            ..HttpOptions::default()
        },
    };

    geoextract::extract(&request, &options).with_context(|| {
        format!(
            "failed to extract {} into {}",
            request.url,
            request.destination.display()
        )
    })?;
    Ok(())
}

/// `-q`/`-v` win over the environment; otherwise `GEOEXTRACT_LOG`, else `info`.
fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
