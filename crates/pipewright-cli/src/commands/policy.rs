use std::path::Path;

use anyhow::{Context, Result};
use pipewright_engine::policy::PolicyBuilder;

/// Execute the `policy` command: resolve the pipeline without side effects
/// and emit the least-privilege policy for its job principal.
pub fn execute(pipeline_path: &Path, output: Option<&Path>) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    let (descriptor, _plan) = super::resolve_plan(&config)?;

    let policy = PolicyBuilder::new(config.platform_context()).build(&descriptor);
    let json = policy.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write policy to {}", path.display()))?;
            tracing::info!(
                principal = %descriptor.principal.name,
                path = %path.display(),
                "Policy written"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
