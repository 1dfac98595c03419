//! Side-effect-free provisioner that records a resolution plan.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Result;
use serde::Serialize;

use pipewright_types::platform::PlatformContext;
use pipewright_types::policy::PolicyDocument;
use pipewright_types::refs::{
    DatabaseRef, JobRef, OutputRef, OutputRefs, PrincipalRef, ResourceKind, StreamRef, TableRef,
};

use crate::defaults;
use crate::provision::{
    CatalogProvisioner, DatabaseSettings, JobProvisioner, JobRequest, OutputStoreProvisioner,
    OutputStoreSettings, PolicyAttachmentSink, StreamProvisioner, StreamSettings, TableRequest,
};

/// Whether a planned step reuses an existing resource or creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedOp {
    Reuse,
    Create,
}

/// One recorded provisioner call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedAction {
    pub op: PlannedOp,
    pub kind: ResourceKind,
    pub name: String,
    /// Settings and linkage parameters worth surfacing in a plan.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

/// A recorded policy attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyAttachment {
    pub principal: PrincipalRef,
    pub policy: PolicyDocument,
}

/// Provisioner that plans instead of provisions.
///
/// Implements every collaborator seam without side effects: lookups echo
/// the caller's reference, creates mint deterministic identities from the
/// platform context. Every call appends to a shared ordered action log;
/// clones share that log, so one recorder can serve all four seams of a
/// [`Provisioners`](crate::resolver::Provisioners) set at once.
#[derive(Debug, Clone)]
pub struct PlanProvisioner {
    ctx: PlatformContext,
    actions: Rc<RefCell<Vec<PlannedAction>>>,
    attachments: Rc<RefCell<Vec<PolicyAttachment>>>,
}

impl PlanProvisioner {
    #[must_use]
    pub fn new(ctx: PlatformContext) -> Self {
        Self {
            ctx,
            actions: Rc::default(),
            attachments: Rc::default(),
        }
    }

    /// Snapshot of the ordered action log.
    #[must_use]
    pub fn actions(&self) -> Vec<PlannedAction> {
        self.actions.borrow().clone()
    }

    /// Snapshot of the recorded policy attachments.
    #[must_use]
    pub fn attachments(&self) -> Vec<PolicyAttachment> {
        self.attachments.borrow().clone()
    }

    fn record(
        &self,
        op: PlannedOp,
        kind: ResourceKind,
        name: &str,
        details: BTreeMap<String, String>,
    ) {
        self.actions.borrow_mut().push(PlannedAction {
            op,
            kind,
            name: name.to_string(),
            details,
        });
    }

    fn reuse(&self, kind: ResourceKind, name: &str) {
        self.record(PlannedOp::Reuse, kind, name, BTreeMap::new());
    }

    fn output_ref(&self, name: &str) -> OutputRef {
        OutputRef {
            name: name.to_string(),
            arn: self.ctx.output_store_arn(name),
            uri: format!("store://{name}"),
        }
    }

    fn principal_for(&self, job_name: &str) -> PrincipalRef {
        let name = defaults::principal_name(job_name);
        PrincipalRef {
            arn: self.ctx.principal_arn(&name),
            name,
        }
    }
}

impl StreamProvisioner for PlanProvisioner {
    fn lookup_stream(&mut self, existing: &StreamRef) -> Result<StreamRef> {
        self.reuse(ResourceKind::Stream, &existing.name);
        Ok(existing.clone())
    }

    fn create_stream(&mut self, settings: &StreamSettings) -> Result<StreamRef> {
        let details = BTreeMap::from([
            ("shard_count".to_string(), settings.shard_count.to_string()),
            (
                "retention_hours".to_string(),
                settings.retention_hours.to_string(),
            ),
            (
                "encrypt_at_rest".to_string(),
                settings.encrypt_at_rest.to_string(),
            ),
        ]);
        self.record(PlannedOp::Create, ResourceKind::Stream, &settings.name, details);
        Ok(StreamRef {
            name: settings.name.clone(),
            arn: self.ctx.stream_arn(&settings.name),
        })
    }
}

impl CatalogProvisioner for PlanProvisioner {
    fn lookup_database(&mut self, existing: &DatabaseRef) -> Result<DatabaseRef> {
        self.reuse(ResourceKind::Database, &existing.name);
        Ok(existing.clone())
    }

    fn create_database(&mut self, settings: &DatabaseSettings) -> Result<DatabaseRef> {
        self.record(
            PlannedOp::Create,
            ResourceKind::Database,
            &settings.name,
            BTreeMap::new(),
        );
        Ok(DatabaseRef {
            name: settings.name.clone(),
            arn: self.ctx.database_arn(&settings.name),
        })
    }

    fn lookup_table(&mut self, existing: &TableRef) -> Result<TableRef> {
        self.reuse(ResourceKind::Table, &existing.name);
        Ok(existing.clone())
    }

    fn create_table(&mut self, request: &TableRequest) -> Result<TableRef> {
        let details = BTreeMap::from([
            ("database".to_string(), request.database.name.clone()),
            ("location".to_string(), request.location.clone()),
            (
                "data_format".to_string(),
                request.data_format.catalog_name().to_string(),
            ),
            ("columns".to_string(), request.columns.len().to_string()),
        ]);
        self.record(PlannedOp::Create, ResourceKind::Table, &request.name, details);
        Ok(TableRef {
            name: request.name.clone(),
            arn: self.ctx.table_arn(&request.database.name, &request.name),
        })
    }
}

impl OutputStoreProvisioner for PlanProvisioner {
    fn lookup_output_store(&mut self, existing: &OutputRef) -> Result<OutputRef> {
        self.reuse(ResourceKind::OutputStore, &existing.name);
        Ok(existing.clone())
    }

    fn create_output_store(&mut self, settings: &OutputStoreSettings) -> Result<OutputRefs> {
        let details = BTreeMap::from([(
            "versioned".to_string(),
            settings.versioned.to_string(),
        )]);
        self.record(
            PlannedOp::Create,
            ResourceKind::OutputStore,
            &settings.name,
            details,
        );
        let primary = self.output_ref(&settings.name);

        let secondary = if settings.error_store {
            let name = defaults::error_store_name(&settings.name);
            self.record(
                PlannedOp::Create,
                ResourceKind::OutputStore,
                &name,
                BTreeMap::from([("purpose".to_string(), "error_records".to_string())]),
            );
            Some(self.output_ref(&name))
        } else {
            None
        };

        Ok(OutputRefs { primary, secondary })
    }
}

impl JobProvisioner for PlanProvisioner {
    fn lookup_job(&mut self, existing: &JobRef) -> Result<(JobRef, PrincipalRef)> {
        self.reuse(ResourceKind::Job, &existing.name);
        Ok((existing.clone(), self.principal_for(&existing.name)))
    }

    fn create_job(&mut self, request: &JobRequest) -> Result<(JobRef, PrincipalRef)> {
        let mut details = request.default_args.clone();
        details.insert("script_location".to_string(), request.script_location.clone());
        details.insert("engine_version".to_string(), request.engine_version.clone());
        details.insert("worker_type".to_string(), request.worker_type.clone());
        details.insert("worker_count".to_string(), request.worker_count.to_string());
        details.insert(
            "timeout_minutes".to_string(),
            request.timeout_minutes.to_string(),
        );
        self.record(PlannedOp::Create, ResourceKind::Job, &request.name, details);
        Ok((
            JobRef {
                name: request.name.clone(),
                arn: self.ctx.job_arn(&request.name),
            },
            self.principal_for(&request.name),
        ))
    }
}

impl PolicyAttachmentSink for PlanProvisioner {
    fn attach(&mut self, principal: &PrincipalRef, policy: &PolicyDocument) -> Result<()> {
        tracing::debug!(
            principal = %principal.name,
            statements = policy.statements.len(),
            "Recorded policy attachment"
        );
        self.attachments.borrow_mut().push(PolicyAttachment {
            principal: principal.clone(),
            policy: policy.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PlatformContext {
        PlatformContext::default()
    }

    #[test]
    fn lookup_echoes_the_callers_reference() {
        let mut plan = PlanProvisioner::new(ctx());
        let existing = StreamRef {
            name: "clicks".into(),
            arn: ctx().stream_arn("clicks"),
        };
        let resolved = plan.lookup_stream(&existing).unwrap();
        assert_eq!(resolved, existing);
        let actions = plan.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].op, PlannedOp::Reuse);
        assert_eq!(actions[0].kind, ResourceKind::Stream);
    }

    #[test]
    fn create_stream_mints_arn_from_context() {
        let mut plan = PlanProvisioner::new(PlatformContext::new("cloud", "us-east-1", "123456789012"));
        let settings = StreamSettings {
            name: "clickstream-stream".into(),
            shard_count: 2,
            retention_hours: 48,
            encrypt_at_rest: true,
        };
        let stream = plan.create_stream(&settings).unwrap();
        assert_eq!(
            stream.arn.as_str(),
            "arn:cloud:stream:us-east-1:123456789012:stream/clickstream-stream"
        );
        let actions = plan.actions();
        assert_eq!(actions[0].details["shard_count"], "2");
        assert_eq!(actions[0].details["retention_hours"], "48");
    }

    #[test]
    fn create_output_store_with_error_store_plans_two_resources() {
        let mut plan = PlanProvisioner::new(ctx());
        let settings = OutputStoreSettings {
            name: "clickstream-output".into(),
            versioned: true,
            error_store: true,
        };
        let refs = plan.create_output_store(&settings).unwrap();
        assert_eq!(refs.primary.uri, "store://clickstream-output");
        assert_eq!(
            refs.secondary.as_ref().map(|s| s.name.as_str()),
            Some("clickstream-output-errors")
        );
        let actions = plan.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].details["purpose"], "error_records");
    }

    #[test]
    fn clones_share_one_action_log() {
        let plan = PlanProvisioner::new(ctx());
        let mut stream_seam = plan.clone();
        let mut catalog_seam = plan.clone();

        let settings = StreamSettings {
            name: "a-stream".into(),
            shard_count: 1,
            retention_hours: 24,
            encrypt_at_rest: true,
        };
        stream_seam.create_stream(&settings).unwrap();
        catalog_seam
            .create_database(&DatabaseSettings { name: "a_db".into() })
            .unwrap();

        let kinds: Vec<ResourceKind> = plan.actions().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Stream, ResourceKind::Database]);
    }

    #[test]
    fn lookup_job_mints_deterministic_principal() {
        let mut plan = PlanProvisioner::new(ctx());
        let existing = JobRef {
            name: "legacy-etl".into(),
            arn: ctx().job_arn("legacy-etl"),
        };
        let (job, principal) = plan.lookup_job(&existing).unwrap();
        assert_eq!(job, existing);
        assert_eq!(principal.name, "legacy-etl-role");
        assert_eq!(
            principal.arn.as_str(),
            "arn:cloud:identity::000000000000:role/legacy-etl-role"
        );
    }

    #[test]
    fn attach_records_the_document() {
        let mut plan = PlanProvisioner::new(ctx());
        let principal = plan.principal_for("clickstream-etl");
        let policy = PolicyDocument::new(Vec::new());
        plan.attach(&principal, &policy).unwrap();
        let attachments = plan.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].principal.name, "clickstream-etl-role");
    }
}
