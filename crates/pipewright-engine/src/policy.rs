//! Least-privilege policy derivation for the job's execution identity.
//!
//! The builder is a pure function over a fully-resolved descriptor: no
//! lookups, no side effects, no failure path. Scope is as narrow as the
//! platform allows; the two wildcard-resource statements are capabilities
//! the platform does not address per-resource and are condition-guarded or
//! accepted exceptions.

use pipewright_types::platform::PlatformContext;
use pipewright_types::policy::{
    PolicyDocument, Statement, ACTION_GET_JOB, ACTION_GET_SECURITY_CONFIGURATION,
    ACTION_GET_TABLE, ACTION_PUT_METRIC_DATA, CONDITION_SECURE_TRANSPORT,
    CONDITION_TELEMETRY_NAMESPACE, SCOPE_ANY, STREAM_CONSUMER_ACTIONS, TELEMETRY_NAMESPACE,
};
use pipewright_types::refs::PipelineDescriptor;

/// Derives the permission set a job principal needs to run one pipeline.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    ctx: PlatformContext,
}

impl PolicyBuilder {
    #[must_use]
    pub fn new(ctx: PlatformContext) -> Self {
        Self { ctx }
    }

    /// Build the five-statement policy for a resolved pipeline.
    ///
    /// Idempotent: the same descriptor yields a byte-identical serialized
    /// document. Attachment is the caller's concern via
    /// [`PolicyAttachmentSink`](crate::provision::PolicyAttachmentSink).
    #[must_use]
    pub fn build(&self, descriptor: &PipelineDescriptor) -> PolicyDocument {
        PolicyDocument::new(vec![
            self.read_job_metadata(descriptor),
            self.read_security_configuration(),
            self.read_catalog(descriptor),
            self.publish_telemetry(),
            self.consume_stream(descriptor),
        ])
    }

    fn read_job_metadata(&self, d: &PipelineDescriptor) -> Statement {
        Statement::allow("ReadJobMetadata")
            .action(ACTION_GET_JOB)
            .resource(&d.job.arn)
    }

    /// Security configuration lookup has no per-resource addressing on the
    /// platform; the wildcard scope is an accepted exception.
    fn read_security_configuration(&self) -> Statement {
        Statement::allow("ReadSecurityConfiguration")
            .action(ACTION_GET_SECURITY_CONFIGURATION)
            .resource(SCOPE_ANY)
    }

    /// Catalog reads need the table, its owning database, and the catalog
    /// root as three distinct scopes; the platform checks all three on a
    /// table fetch.
    fn read_catalog(&self, d: &PipelineDescriptor) -> Statement {
        Statement::allow("ReadCatalog")
            .action(ACTION_GET_TABLE)
            .resource(self.ctx.catalog_arn())
            .resource(&d.database.arn)
            .resource(&d.table.arn)
    }

    /// Telemetry is scoped by namespace condition, not resource ARN, and
    /// requires secure transport. Never unconditional.
    fn publish_telemetry(&self) -> Statement {
        Statement::allow("PublishTelemetry")
            .action(ACTION_PUT_METRIC_DATA)
            .resource(SCOPE_ANY)
            .condition(
                "string_equals",
                CONDITION_TELEMETRY_NAMESPACE,
                TELEMETRY_NAMESPACE,
            )
            .condition("bool", CONDITION_SECURE_TRANSPORT, "true")
    }

    /// The full consumer capability set on exactly one stream. Fewer
    /// actions and the job fails at runtime; more and the grant is no
    /// longer least-privilege.
    fn consume_stream(&self, d: &PipelineDescriptor) -> Statement {
        Statement::allow("ConsumeStream")
            .actions(STREAM_CONSUMER_ACTIONS)
            .resource(&d.stream.arn)
    }
}
