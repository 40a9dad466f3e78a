use std::path::PathBuf;

use anyhow::Context as _;
use luxtris_engine::EngineConfig;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Configuration file to validate (JSON format, missing fields use defaults)
    #[arg(long)]
    check: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ConfigArg) -> anyhow::Result<()> {
    let ConfigArg { check, output } = arg;

    let config: EngineConfig = match check {
        Some(path) => {
            eprintln!("Checking configuration {}", path.display());
            util::read_json_file("engine config", path)?
        }
        None => EngineConfig::default(),
    };
    config
        .validate()
        .context("Engine configuration is invalid")?;
    if check.is_some() {
        eprintln!("Configuration is valid");
    }

    let mut output = Output::from_output_path(output.as_deref())?;
    output.write_json(&config)
}
