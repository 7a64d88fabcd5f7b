//! Attribute sources
//!
//! Attributes come from an optional TOML file, then `--set` overrides
//! applied in order.

use anyhow::{Context, Result};
use clap::Args;
use headline_core::{AttributeName, Attributes};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct AttributeArgs {
    /// TOML file of element attributes
    #[arg(short, long, value_name = "FILE")]
    pub attributes: Option<PathBuf>,

    /// Override one attribute (repeatable)
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,
}

impl AttributeArgs {
    pub fn load(&self) -> Result<Attributes> {
        let mut attributes = match &self.attributes {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Attributes::from_toml_str(&source)
                    .with_context(|| format!("Invalid attribute file {}", path.display()))?
            }
            None => Attributes::new(),
        };

        for pair in &self.overrides {
            let (name, value) = parse_override(pair)?;
            tracing::debug!("override {} = {:?}", name, value);
            attributes.set(name, value);
        }
        Ok(attributes)
    }
}

fn parse_override(pair: &str) -> Result<(AttributeName, &str)> {
    let (name, value) = pair
        .split_once('=')
        .with_context(|| format!("Expected NAME=VALUE, got '{}'", pair))?;
    let name = name
        .trim()
        .parse()
        .with_context(|| format!("Invalid override '{}'", pair))?;
    Ok((name, value))
}
