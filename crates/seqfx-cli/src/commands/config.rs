//! Config command: prints the effective engine configuration.

use anyhow::Result;

/// Runs the config command.
pub fn run(threads: usize) -> Result<()> {
    let cfg = super::load_config(None, threads)?;
    print!("{}", cfg.to_yaml()?);
    Ok(())
}
