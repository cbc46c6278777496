//! `termfix config`: print the effective configuration.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    output(
        &ConfigOutput {
            config: config.clone(),
        },
        json_mode,
    );
    Ok(())
}
