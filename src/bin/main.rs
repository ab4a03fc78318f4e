use std::io::Write;

use clap::Parser;
use log::{error, info};

use logistics_kpi::{ErrorResponse, ThresholdTable, DEFAULT_MAX_SIZE};

/// Computes the logistics KPIs of a dataset and checks them against the ISO thresholds
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the dataset CSV file
    filename: std::path::PathBuf,
    /// The largest accepted file size in bytes
    #[clap(long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u64,
    /// Pretty-print the JSON report
    #[clap(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let thresholds = ThresholdTable::iso();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let exit_code = match logistics_kpi::process_file(&args.filename, args.max_size, &thresholds) {
        Ok(response) => {
            info!("processed `{}`", args.filename.display());
            write_json(&mut out, &response, args.pretty)?;
            0
        }
        Err(err) => {
            error!("failed to process `{}`: {}", args.filename.display(), err);
            write_json(&mut out, &ErrorResponse::from(&err), args.pretty)?;
            match err.is_client_error() {
                true => 2,
                false => 1,
            }
        }
    };

    out.flush()?;
    std::process::exit(exit_code)
}

fn write_json<W, T>(out: &mut W, value: &T, pretty: bool) -> anyhow::Result<()>
    where W: Write,
          T: serde::Serialize
{
    match pretty {
        true => serde_json::to_writer_pretty(&mut *out, value)?,
        false => serde_json::to_writer(&mut *out, value)?,
    }
    writeln!(out)?;

    Ok(())
}
