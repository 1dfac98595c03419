//! Platform addressing: ARN-equivalents and the partition/region/account context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ARN-equivalent resource name.
///
/// Rendered as `arn:{partition}:{service}:{region}:{account}:{resource}` and
/// treated as an opaque string everywhere downstream; only
/// [`PlatformContext`] knows how to mint one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arn(String);

impl Arn {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Arn {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Arn {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Arn> for String {
    fn from(value: Arn) -> Self {
        value.0
    }
}

impl From<&Arn> for String {
    fn from(value: &Arn) -> Self {
        value.0.clone()
    }
}

/// Partition/region/account triple used to derive ARNs for created resources.
///
/// Passed explicitly into the plan provisioner and the policy builder; the
/// resolver never reads account identity from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformContext {
    pub partition: String,
    pub region: String,
    pub account: String,
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self {
            partition: "cloud".to_string(),
            region: "local".to_string(),
            account: "000000000000".to_string(),
        }
    }
}

impl PlatformContext {
    pub fn new(
        partition: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            region: region.into(),
            account: account.into(),
        }
    }

    fn arn(&self, service: &str, resource: &str) -> Arn {
        Arn(format!(
            "arn:{}:{}:{}:{}:{}",
            self.partition, service, self.region, self.account, resource
        ))
    }

    pub fn stream_arn(&self, name: &str) -> Arn {
        self.arn("stream", &format!("stream/{name}"))
    }

    /// Catalog root scope. Covers the account-wide catalog, not a single entry.
    pub fn catalog_arn(&self) -> Arn {
        self.arn("catalog", "catalog")
    }

    pub fn database_arn(&self, database: &str) -> Arn {
        self.arn("catalog", &format!("database/{database}"))
    }

    pub fn table_arn(&self, database: &str, table: &str) -> Arn {
        self.arn("catalog", &format!("table/{database}/{table}"))
    }

    pub fn job_arn(&self, name: &str) -> Arn {
        self.arn("jobs", &format!("job/{name}"))
    }

    /// Identity ARNs are partition-global: no region component.
    pub fn principal_arn(&self, name: &str) -> Arn {
        Arn(format!(
            "arn:{}:identity::{}:role/{}",
            self.partition, self.account, name
        ))
    }

    /// Object-store names are globally unique: no region or account component.
    pub fn output_store_arn(&self, name: &str) -> Arn {
        Arn(format!("arn:{}:store:::{}", self.partition, name))
    }
}
