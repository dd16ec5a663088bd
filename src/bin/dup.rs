//! docmeta-dup - find duplicate files under one or more directories.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use docmeta::dedup::{self, human_size};

/// docmeta-dup - report files with identical content
#[derive(Parser, Debug)]
#[command(name = "docmeta-dup")]
#[command(about = "Find duplicate files under one or more directories")]
#[command(version)]
struct Cli {
    /// Directories to scan
    #[arg(value_name = "DIR", required = true)]
    dirs: Vec<PathBuf>,

    /// Emit the duplicate groups as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    for dir in &cli.dirs {
        if !dir.is_dir() {
            bail!("{} is not a valid path, please verify", dir.display());
        }
    }

    let groups = dedup::find_duplicates(&cli.dirs)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("No duplicate files found.");
        return Ok(());
    }

    println!("Duplicates:");
    for group in &groups {
        println!("  {}", human_size(group.size));
        for path in &group.paths {
            println!("    {}", path.display());
        }
    }
    println!(
        "TOTAL {} reclaimable",
        human_size(dedup::total_wasted_bytes(&groups))
    );
    Ok(())
}
