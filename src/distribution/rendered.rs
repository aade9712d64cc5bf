//! Rendered distribution with provenance
//!
//! Records the document together with the override sources that produced
//! it, so a rendered config can be traced back to its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Mapping;

use super::builder::DistributionConfigDocument;

/// Schema identifier
pub const SCHEMA_ID: &str = "s3site/rendered_distribution@1";

/// Origin of an override layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverrideOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing override source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverrideSource {
    pub origin: OverrideOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl OverrideSource {
    pub fn builtin() -> Self {
        Self {
            origin: OverrideOrigin::Builtin,
            path: None,
            digest: None,
        }
    }

    pub fn file(path: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            origin: OverrideOrigin::File,
            path: Some(path.into()),
            digest: Some(digest.into()),
        }
    }

    pub fn cli() -> Self {
        Self {
            origin: OverrideOrigin::Cli,
            path: None,
            digest: None,
        }
    }
}

/// A rendered distribution config
#[derive(Debug, Clone, Serialize)]
pub struct RenderedDistribution {
    pub schema_id: String,

    /// When this document was rendered
    pub created_at: DateTime<Utc>,

    pub bucket: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_domain_name: Option<String>,

    /// Contributing sources in precedence order
    pub sources: Vec<OverrideSource>,

    /// The merged configuration tree
    pub config: Mapping,

    /// The XML document
    pub document: String,
}

impl RenderedDistribution {
    pub fn new(
        bucket: impl Into<String>,
        document: &DistributionConfigDocument,
        sources: Vec<OverrideSource>,
    ) -> Self {
        Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            bucket: bucket.into(),
            origin_domain_name: document.origin_domain_name().map(str::to_string),
            sources,
            config: document.merged().clone(),
            document: document.as_str().to_string(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
