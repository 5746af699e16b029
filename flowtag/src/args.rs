use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Path to the VPC flow log file
    #[clap(long, default_value = "flow_log.txt")]
    pub flowlog: String,

    /// Path to the lookup CSV file
    #[clap(long, default_value = "lookup.csv")]
    pub lookup: String,

    /// Path to the output file
    #[clap(long, default_value = "output.txt")]
    pub output: String,

    /// Fail when the lookup table maps the same port/protocol pair twice
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub strict_lookup: bool,

    /// Read the settings from a TOML configuration file instead of the flags
    #[clap(long)]
    pub config_file: Option<String>,
}

/// Settings of a run, either taken from the flags or loaded with `confy`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub flowlog: String,
    pub lookup: String,
    pub output: String,
    #[serde(default)]
    pub strict_lookup: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            flowlog: String::from("flow_log.txt"),
            lookup: String::from("lookup.csv"),
            output: String::from("output.txt"),
            strict_lookup: false,
        }
    }
}

impl From<&Cli> for ConfigFile {
    fn from(cli: &Cli) -> Self {
        ConfigFile {
            flowlog: cli.flowlog.clone(),
            lookup: cli.lookup.clone(),
            output: cli.output.clone(),
            strict_lookup: cli.strict_lookup,
        }
    }
}
