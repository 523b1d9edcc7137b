use clap::Parser;
use eyre::{Context, Result};
use std::io::Write;

use vdbinspect::cli::Cli;
use vdbinspect::config::Config;
use vdbinspect::{InspectOptions, inspect, render_json, render_text};

fn setup_logging(json: bool) -> Result<()> {
    // JSON output must stay machine readable: only errors, tagged with their level
    let level = if json { log::LevelFilter::Error } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            if json {
                writeln!(buf, "{}: {}", record.level(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .target(env_logger::Target::Stderr)
        .try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let options = InspectOptions {
        store_type: cli.vector_store_type,
        list_chunks: cli.list_chunks,
        sample: cli.sample,
    };
    let report = inspect(&cli.db_path, &options, &config)?;

    if cli.json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report, &config)?);
    }

    Ok(())
}
