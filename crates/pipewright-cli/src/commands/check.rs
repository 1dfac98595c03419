use std::path::Path;

use anyhow::Result;
use pipewright_engine::config::bundle::{JobSpec, ResourceSpec};
use pipewright_engine::config::validator;

/// Execute the `check` command: parse and validate the pipeline file.
pub fn execute(pipeline_path: &Path) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    println!("Pipeline file:     OK");

    let bundle = match validator::validate(&config) {
        Ok(bundle) => bundle,
        Err(err) => {
            println!("Pipeline config:   FAILED");
            println!("  {err}");
            anyhow::bail!("Pipeline validation failed")
        }
    };
    println!("Pipeline config:   OK");

    println!("Schema source:     {}", bundle.schema.source.kind());
    for shadowed in &bundle.schema.shadowed {
        println!("  shadowed: {shadowed}");
    }
    println!("Stream:            {}", channel_label(&bundle.stream));
    println!("Database:          {}", channel_label(&bundle.database));
    println!(
        "Job:               {}",
        match &bundle.job {
            JobSpec::Existing(job) => format!("reuse {}", job.name),
            JobSpec::Create(_) => "create".to_string(),
        }
    );
    println!(
        "Output store:      {} ({})",
        channel_label(&bundle.output_store.channel),
        bundle.output_store.kind
    );

    println!("\nAll checks passed.");
    Ok(())
}

fn channel_label<R, P>(spec: &ResourceSpec<R, P>) -> &'static str {
    match spec {
        ResourceSpec::Existing(_) => "reuse existing",
        ResourceSpec::Create(_) => "create with overrides",
        ResourceSpec::Default => "create from defaults",
    }
}
