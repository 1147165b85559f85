use anyhow::Result;

use relkit_core::{CommandRunner, RunOptions, Runnable};

use crate::config::{RelkitConfig, Step};
use crate::run::run;

fn run_steps(steps: &[Step]) -> Result<()> {
    for step in steps {
        run(&step.cmd, &step.loading, &step.finished)?;
    }
    Ok(())
}

/// Wraps the prep stage in Preparing/Prepared messages for the composite
/// scripts. Prep failures surface as a normalized `Error Preparing`; the
/// failing step has already logged its own output.
fn prep_stage(cfg: &RelkitConfig) -> Result<()> {
    let mut runner = CommandRunner::default();
    let prep_cfg = cfg.clone();

    runner.run(
        Runnable::callable(move || prep(&prep_cfg).map(|()| None)),
        RunOptions {
            loading_description: Some("Preparing".into()),
            finished_description: Some("Prepared".into()),
            ..Default::default()
        },
    )?;

    Ok(())
}

/// Install dependencies, lint, build, and test.
pub fn prep(cfg: &RelkitConfig) -> Result<()> {
    run_steps(&cfg.prep_steps())
}

/// Prep, then produce a distributable package.
pub fn pack(cfg: &RelkitConfig) -> Result<()> {
    prep_stage(cfg)?;
    run_steps(&cfg.pack_steps())
}

/// Prep, then publish the package.
pub fn publish(cfg: &RelkitConfig) -> Result<()> {
    prep_stage(cfg)?;
    run_steps(&cfg.publish_steps())
}
