use std::path::{self, PathBuf};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::error;

use flowtag::{
    args::{Cli, ConfigFile},
    Diagnostics, FlowAggregator, LogDiagnostics, LookupLoader, ReportWriter,
};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // If a config file is provided, it replaces the command line settings
    let config = if let Some(config_path) = &cli.config_file {
        match confy::load_path::<ConfigFile>(config_path) {
            Ok(cfg_file) => cfg_file,
            Err(e) => {
                error!("Error loading configuration file: {:?}", e);
                std::process::exit(1);
            }
        }
    } else {
        ConfigFile::from(&cli)
    };

    let diagnostics = LogDiagnostics;
    match run(&config, &diagnostics) {
        Ok(output) => {
            println!(
                "Processing complete. Output written to '{}'.",
                output.display()
            );
        }
        Err(e) => {
            diagnostics.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn run(config: &ConfigFile, diagnostics: &dyn Diagnostics) -> anyhow::Result<PathBuf> {
    let flowlog = path::absolute(&config.flowlog)
        .with_context(|| format!("Error resolving flow log file path '{}'", config.flowlog))?;
    let lookup = path::absolute(&config.lookup)
        .with_context(|| format!("Error resolving lookup file path '{}'", config.lookup))?;
    let output = path::absolute(&config.output)
        .with_context(|| format!("Error resolving output file path '{}'", config.output))?;

    diagnostics.info(&format!("Flow Log File: {}", flowlog.display()));
    diagnostics.info(&format!("Lookup File: {}", lookup.display()));
    diagnostics.info(&format!("Output File: {}", output.display()));

    let lookup_table = LookupLoader::new(diagnostics)
        .strict(config.strict_lookup)
        .load(&lookup)
        .context("Error loading lookup table")?;

    let (counts, _summary) = FlowAggregator::new(&lookup_table, diagnostics)
        .aggregate(&flowlog)
        .context("Error processing flow logs")?;

    let mut writer = ReportWriter::create(&output).context("Error writing output")?;
    writer
        .write_report(&counts)
        .context("Error writing output")?;
    writer.flush_and_close().context("Error writing output")?;

    Ok(output)
}
