//! Site configuration file
//!
//! A site file names the bucket, optionally its region, and carries the
//! user's CloudFront overrides:
//!
//! ```toml
//! s3_bucket = "my-site"
//! s3_endpoint = "eu-west-1"
//!
//! [cloudfront_distribution_config]
//! default_cache_behavior = { min_TTL = 987 }
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::value::{Mapping, Value};

/// Default site file name, looked up in the working directory
pub const DEFAULT_SITE_FILE: &str = "s3site.toml";

/// Facts about the S3 website the distribution is built for.
pub trait ConfigSource {
    /// Bucket name. Required; an empty name is rejected at build time.
    fn bucket_name(&self) -> &str;

    /// Region code of the bucket, if configured.
    fn region_hint(&self) -> Option<&str>;
}

/// A bucket and region given directly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSite {
    pub bucket: String,
    pub region: Option<String>,
}

impl BucketSite {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl ConfigSource for BucketSite {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    fn region_hint(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

/// Parsed site file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Bucket hosting the website
    #[serde(default)]
    pub s3_bucket: Option<String>,

    /// Region code of the bucket
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// CloudFront overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudfront_distribution_config: Option<Mapping>,
}

impl ConfigSource for SiteConfig {
    fn bucket_name(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or("")
    }

    fn region_hint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }
}

/// A site file together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedSiteConfig {
    pub path: PathBuf,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,

    pub config: SiteConfig,
}

/// Site configuration errors
#[derive(Debug, thiserror::Error)]
pub enum SiteConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Site file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid override assignment '{assignment}': {reason}")]
    InvalidAssignment {
        assignment: String,
        reason: &'static str,
    },
}

impl SiteConfig {
    /// Load a site file, recording its digest
    pub fn load(path: &Path) -> Result<LoadedSiteConfig, SiteConfigError> {
        if !path.exists() {
            return Err(SiteConfigError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| {
            SiteConfigError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let config = Self::parse(&contents)?;

        tracing::debug!(path = %path.display(), %digest, "loaded site config");

        Ok(LoadedSiteConfig {
            path: path.to_path_buf(),
            digest,
            config,
        })
    }

    /// Parse a site file from a TOML string
    pub fn parse(content: &str) -> Result<Self, SiteConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The override tree, empty when the file has none
    pub fn overrides(&self) -> Mapping {
        self.cloudfront_distribution_config.clone().unwrap_or_default()
    }
}

/// Build an override layer from `path.to.key=value` assignments.
///
/// A later assignment to the same key wins. Assigning below a key that
/// already holds a value, or to a key that already has children, fails.
pub fn parse_override_assignments(assignments: &[String]) -> Result<Mapping, SiteConfigError> {
    let mut layer = Mapping::new();
    for assignment in assignments {
        let invalid = |reason: &'static str| SiteConfigError::InvalidAssignment {
            assignment: assignment.clone(),
            reason,
        };

        let (path, value) = assignment
            .split_once('=')
            .ok_or_else(|| invalid("expected PATH=VALUE"))?;

        let parts: Vec<&str> = path.trim().split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty path segment"));
        }

        let below_value = (1..parts.len()).any(|depth| {
            matches!(
                layer.get_path(&parts[..depth].join(".")),
                Some(Value::String(_) | Value::Sequence(_))
            )
        });
        if below_value {
            return Err(invalid("conflicts with an earlier value assignment"));
        }
        if let Some(Value::Mapping(_)) = layer.get_path(&parts.join(".")) {
            return Err(invalid("conflicts with earlier nested assignments"));
        }

        layer.set_path(&parts, Value::String(value.to_string()));
    }
    Ok(layer)
}
