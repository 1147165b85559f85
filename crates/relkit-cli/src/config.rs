use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One release step: a shell command bracketed by progress messages.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub cmd: String,
    pub loading: String,
    pub finished: String,
}

impl Step {
    fn new(cmd: &str, loading: &str, finished: &str) -> Self {
        Self {
            cmd: cmd.to_string(),
            loading: loading.to_string(),
            finished: finished.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    pub name: Option<String>,
}

/// Per-script step lists. A missing list falls back to the cargo defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScriptsConfig {
    pub prep: Option<Vec<Step>>,
    pub pack: Option<Vec<Step>>,
    pub publish: Option<Vec<Step>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RelkitConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

impl RelkitConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let cfg = toml::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse TOML config: {path}"))?;
        Ok(cfg)
    }

    /// Loads `path` when it exists, falling back to built-in defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn prep_steps(&self) -> Vec<Step> {
        self.scripts.prep.clone().unwrap_or_else(default_prep_steps)
    }

    pub fn pack_steps(&self) -> Vec<Step> {
        self.scripts.pack.clone().unwrap_or_else(default_pack_steps)
    }

    pub fn publish_steps(&self) -> Vec<Step> {
        self.scripts
            .publish
            .clone()
            .unwrap_or_else(default_publish_steps)
    }
}

fn default_prep_steps() -> Vec<Step> {
    vec![
        Step::new("cargo fetch", "Installing", "Installed"),
        Step::new(
            "cargo clippy --all-targets -- -D warnings",
            "Linting",
            "Linted",
        ),
        Step::new("cargo build --release", "Building", "Built"),
        Step::new("cargo test --release", "Testing", "Tested"),
    ]
}

fn default_pack_steps() -> Vec<Step> {
    vec![Step::new("cargo package", "Packing", "Packed")]
}

fn default_publish_steps() -> Vec<Step> {
    vec![Step::new("cargo publish", "Publishing", "Published")]
}
