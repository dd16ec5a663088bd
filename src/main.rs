//! docmeta - Main entry point
//!
//! Reads and writes the embedded metadata payload of PDF documents by
//! driving the external exiftool engine.

use log::{debug, error, info};
use std::process;

use docmeta::cli::Cli;
use docmeta::engine::Engine;
use docmeta::ops::{self, ReadOutcome};

/// Initialize the logger with appropriate settings
fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env() // Allows RUST_LOG env var to override
        .init();
}

fn main() {
    init_logger();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {cli:?}");

    if let Err(err) = run(&cli) {
        error!("{err}");
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    cli.validate()?;
    let engine = Engine::new()?;

    if let Some(output) = &cli.write {
        let Some(source) = cli.metadata_source() else {
            anyhow::bail!("Both --meta and --write must be specified at the same time.");
        };
        ops::write_single(&engine, &cli.files[0], output, &source)?;
        info!("Metadata written to {}", output.display());
        println!("Write into {} successful!", output.display());
        return Ok(());
    }

    match ops::read(&engine, &cli.files, cli.format())? {
        ReadOutcome::Rendered(text) => println!("{text}"),
        ReadOutcome::Batch(outcomes) => {
            let mut failures = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(target) => {
                        println!("{} -> {}", outcome.source.display(), target.display());
                    }
                    Err(err) => {
                        failures += 1;
                        eprintln!("{}: {err}", outcome.source.display());
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} of {} files could not be read", outcomes.len());
            }
        }
    }
    Ok(())
}
