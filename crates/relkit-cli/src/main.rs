use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod run;
mod scripts;
mod styles;

use config::RelkitConfig;

#[allow(unused_imports)]
use styles as s;

/// The command-line interface for relkit.
#[derive(Debug, Parser)]
#[command(name = "rk")]
#[command(version)]
#[command(styles = s::get_clap_styles())]
#[command(
    help_template = "{bin} {version}\n\n{about-with-newline}{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
#[command(about = "Release helper: prep, pack, and publish scripts")]
#[command(
    long_about = "Relkit drives the repetitive part of cutting a release. Each script is a
sequence of shell commands bracketed by progress messages, configurable
through relkit.toml and defaulting to the standard cargo workflow.

Scripts:
  prep              Install dependencies, lint, build, and test
  pack              Prep, then produce a distributable package
  publish           Prep, then publish the package
"
)]
struct Cli {
    /// Script to run: `prep`, `pack`, or `publish`
    script: Option<String>,
    /// Path to the relkit config file.
    #[arg(long, default_value = "relkit.toml")]
    config: String,
    /// Enable debug-level logging.
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Prep,
    Pack,
    Publish,
}

impl FromStr for Script {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "prep" => Ok(Self::Prep),
            "pack" => Ok(Self::Pack),
            "publish" => Ok(Self::Publish),
            other => Err(anyhow!("unknown script '{other}'")),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();
    debug!("parsed cli arguments: {:?}", cli);

    let script_name = match &cli.script {
        Some(script) => script,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!(); // Add a newline after help
            return Ok(());
        }
    };

    let script = Script::from_str(script_name)?;
    let cfg = RelkitConfig::load_or_default(&cli.config)
        .with_context(|| format!("unable to load config '{}'", cli.config))?;

    execute(script, &cfg)
}

/// Dispatches a parsed script.
fn execute(script: Script, cfg: &RelkitConfig) -> Result<()> {
    match script {
        Script::Prep => scripts::prep(cfg),
        Script::Pack => scripts::pack(cfg),
        Script::Publish => scripts::publish(cfg),
    }
}
