pub mod check;
pub mod plan;
pub mod policy;

use std::path::Path;

use anyhow::{Context, Result};
use pipewright_engine::config::parser;
use pipewright_engine::config::types::PipelineConfig;
use pipewright_engine::plan::PlanProvisioner;
use pipewright_engine::resolver::{resolve, Provisioners};
use pipewright_types::refs::PipelineDescriptor;

/// Parse the pipeline file with a path-bearing error context.
fn load_config(pipeline_path: &Path) -> Result<PipelineConfig> {
    parser::parse_pipeline(pipeline_path)
        .with_context(|| format!("Failed to parse pipeline: {}", pipeline_path.display()))
}

/// Resolve against the plan provisioner: full validation and wiring,
/// zero side effects.
fn resolve_plan(config: &PipelineConfig) -> Result<(PipelineDescriptor, PlanProvisioner)> {
    let plan = PlanProvisioner::new(config.platform_context());
    let (mut stream, mut catalog, mut output, mut job) =
        (plan.clone(), plan.clone(), plan.clone(), plan.clone());
    let mut provisioners = Provisioners {
        stream: &mut stream,
        catalog: &mut catalog,
        output: &mut output,
        job: &mut job,
    };
    let descriptor = resolve(config, &mut provisioners)?;
    Ok((descriptor, plan))
}
