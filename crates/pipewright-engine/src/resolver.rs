//! Pipeline resolver: validates the config and drives the provisioners in
//! dependency order.
//!
//! Order is fixed: stream, database, table, output store, job. The table
//! step embeds the resolved stream as its storage location; the job step
//! receives the database, table, and output identifiers through its
//! default arguments. A failure stops the chain at the step in flight;
//! earlier steps keep their side effects.

use pipewright_types::refs::{OutputRefs, PipelineDescriptor};

use crate::config::bundle::{JobSpec, ResourceSpec, SchemaSource};
use crate::config::types::PipelineConfig;
use crate::config::validator;
use crate::defaults;
use crate::error::{ResolveError, ResolveStep};
use crate::provision::{
    CatalogProvisioner, JobProvisioner, OutputStoreProvisioner, StreamProvisioner,
};

/// The collaborator set handed to [`resolve`].
pub struct Provisioners<'a> {
    pub stream: &'a mut dyn StreamProvisioner,
    pub catalog: &'a mut dyn CatalogProvisioner,
    pub output: &'a mut dyn OutputStoreProvisioner,
    pub job: &'a mut dyn JobProvisioner,
}

/// Resolve a pipeline configuration into a fully-wired descriptor.
///
/// Validation runs first; a config violation fails the call before any
/// provisioner is touched. Provisioner failures carry the step that was in
/// flight.
///
/// # Errors
///
/// Returns [`ResolveError::Config`] for input violations and
/// [`ResolveError::Provisioner`] for collaborator failures.
pub fn resolve(
    config: &PipelineConfig,
    provisioners: &mut Provisioners<'_>,
) -> Result<PipelineDescriptor, ResolveError> {
    let bundle = validator::validate(config)?;

    let stream = ensure_resource(
        ResolveStep::Stream,
        &bundle.stream,
        provisioners.stream,
        |p, existing| p.lookup_stream(existing),
        |p, props| p.create_stream(&defaults::stream_settings(&bundle.pipeline, props)),
    )?;

    let database = ensure_resource(
        ResolveStep::Database,
        &bundle.database,
        provisioners.catalog,
        |p, existing| p.lookup_database(existing),
        |p, props| p.create_database(&defaults::database_settings(&bundle.pipeline, props)),
    )?;

    let table = match &bundle.schema.source {
        SchemaSource::ExistingTable(existing) => {
            tracing::info!(step = %ResolveStep::Table, table = %existing.name, "Reusing existing table");
            provisioners
                .catalog
                .lookup_table(existing)
                .map_err(step_error(ResolveStep::Table))?
        }
        SchemaSource::Create(schema) => {
            let request = defaults::table_request(&bundle.pipeline, schema, &database, &stream);
            tracing::info!(
                step = %ResolveStep::Table,
                table = %request.name,
                location = %request.location,
                "Creating table"
            );
            provisioners
                .catalog
                .create_table(&request)
                .map_err(step_error(ResolveStep::Table))?
        }
    };

    let output = ensure_resource(
        ResolveStep::OutputStore,
        &bundle.output_store.channel,
        provisioners.output,
        |p, existing| {
            p.lookup_output_store(existing).map(|primary| OutputRefs {
                primary,
                secondary: None,
            })
        },
        |p, props| p.create_output_store(&defaults::output_store_settings(&bundle.pipeline, props)),
    )?;

    let (job, principal) = match &bundle.job {
        JobSpec::Existing(existing) => {
            tracing::info!(step = %ResolveStep::Job, job = %existing.name, "Reusing existing job");
            provisioners
                .job
                .lookup_job(existing)
                .map_err(step_error(ResolveStep::Job))?
        }
        JobSpec::Create(props) => {
            let request = defaults::job_request(&bundle.pipeline, props, &database, &table, &output);
            tracing::info!(
                step = %ResolveStep::Job,
                job = %request.name,
                workers = request.worker_count,
                "Creating job"
            );
            provisioners
                .job
                .create_job(&request)
                .map_err(step_error(ResolveStep::Job))?
        }
    };

    let descriptor = PipelineDescriptor {
        stream,
        database,
        table,
        job,
        principal,
        output,
    };
    tracing::info!(
        pipeline = %bundle.pipeline,
        stream = %descriptor.stream.name,
        database = %descriptor.database.name,
        table = %descriptor.table.name,
        job = %descriptor.job.name,
        principal = %descriptor.principal.name,
        "Pipeline resolved"
    );
    Ok(descriptor)
}

/// One reuse-or-create strategy for every uniform resource.
///
/// Centralizes the channel branching, the step log line, and the
/// step-tagged error wrapping; the closures only talk to the provisioner.
fn ensure_resource<Prov, R, P, T>(
    step: ResolveStep,
    spec: &ResourceSpec<R, P>,
    provisioner: &mut Prov,
    lookup: impl FnOnce(&mut Prov, &R) -> anyhow::Result<T>,
    create: impl FnOnce(&mut Prov, Option<&P>) -> anyhow::Result<T>,
) -> Result<T, ResolveError>
where
    Prov: ?Sized,
{
    let result = match spec {
        ResourceSpec::Existing(existing) => {
            tracing::info!(step = %step, "Reusing existing resource");
            lookup(provisioner, existing)
        }
        ResourceSpec::Create(props) => {
            tracing::info!(step = %step, overrides = true, "Creating resource");
            create(provisioner, Some(props))
        }
        ResourceSpec::Default => {
            tracing::info!(step = %step, overrides = false, "Creating resource from defaults");
            create(provisioner, None)
        }
    };
    result.map_err(step_error(step))
}

fn step_error(step: ResolveStep) -> impl FnOnce(anyhow::Error) -> ResolveError {
    move |source| ResolveError::Provisioner { step, source }
}
