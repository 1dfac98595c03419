use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use pipewright_engine::alarms::{self, AlarmSpec};
use pipewright_engine::config::types::PipelineConfig;
use pipewright_engine::defaults;
use pipewright_engine::plan::PlannedAction;
use pipewright_engine::provision::StreamSettings;
use pipewright_types::refs::PipelineDescriptor;

#[derive(Serialize)]
struct PlanReport {
    pipeline: String,
    actions: Vec<PlannedAction>,
    descriptor: PipelineDescriptor,
    alarms: Vec<AlarmSpec>,
}

/// Execute the `plan` command: resolve without side effects, print what
/// a real provisioning run would do.
pub fn execute(pipeline_path: &Path, json: bool) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    let (descriptor, plan) = super::resolve_plan(&config)?;

    let alarms = alarms::recommended_alarms(&descriptor.stream, stream_settings(&config).as_ref());
    let report = PlanReport {
        pipeline: config.pipeline.clone(),
        actions: plan.actions(),
        descriptor,
        alarms,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Plan for pipeline `{}`:", report.pipeline);
    for action in &report.actions {
        let op = match action.op {
            pipewright_engine::PlannedOp::Reuse => "reuse ",
            pipewright_engine::PlannedOp::Create => "create",
        };
        println!("  {op}  {:12} {}", action.kind.to_string(), action.name);
        for (key, value) in &action.details {
            println!("          {key} = {value}");
        }
    }

    println!("\nResolved wiring:");
    println!("  stream     {}", report.descriptor.stream.arn);
    println!("  database   {}", report.descriptor.database.arn);
    println!("  table      {}", report.descriptor.table.arn);
    println!("  job        {}", report.descriptor.job.arn);
    println!("  principal  {}", report.descriptor.principal.arn);
    println!("  output     {}", report.descriptor.output.primary.uri);
    if let Some(secondary) = &report.descriptor.output.secondary {
        println!("  errors     {}", secondary.uri);
    }

    println!("\nRecommended alarms:");
    for alarm in &report.alarms {
        println!(
            "  {} on {} (threshold {}, {} period(s))",
            alarm.name, alarm.metric, alarm.threshold, alarm.evaluation_periods
        );
    }

    Ok(())
}

/// Merged creation settings when this plan creates the stream; `None`
/// when an existing stream is reused and its retention is unknown here.
fn stream_settings(config: &PipelineConfig) -> Option<StreamSettings> {
    match &config.stream {
        Some(section) if section.existing.is_some() => None,
        Some(section) => Some(defaults::stream_settings(
            &config.pipeline,
            section.create.as_ref(),
        )),
        None => Some(defaults::stream_settings(&config.pipeline, None)),
    }
}
