//! Distribution config document builder

use std::fmt;

use s3site_regions::WebsiteEndpoint;

use crate::config::{
    default_tree, merge_layers, ConfigSource, Mapping, MergeError, CALLER_REFERENCE_PATH,
    DOMAIN_NAME_PATH, ORIGIN_ID_PATH, TARGET_ORIGIN_ID_PATH,
};

use super::xml::{to_xml, XmlError};

/// Errors building a distribution config
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Failed to serialize distribution config: {0}")]
    Serialize(#[from] XmlError),
}

/// A complete distribution config, ready to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionConfigDocument {
    merged: Mapping,
    xml: String,
}

impl DistributionConfigDocument {
    /// The merged configuration tree
    pub fn merged(&self) -> &Mapping {
        &self.merged
    }

    /// The XML document
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn into_string(self) -> String {
        self.xml
    }

    /// Origin hostname CloudFront will fetch from
    pub fn origin_domain_name(&self) -> Option<&str> {
        self.merged.get_str(&DOMAIN_NAME_PATH.join("."))
    }
}

impl fmt::Display for DistributionConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml)
    }
}

/// Origin id CloudFront uses for a bucket's website origin
pub fn origin_id(bucket: &str) -> String {
    format!("{}-S3-origin", bucket)
}

/// Caller reference used unless an override supplies one
pub fn default_caller_reference(bucket: &str) -> String {
    format!("s3site-{}", bucket)
}

/// Resolve the website endpoint of a source's region hint.
///
/// An unknown hint falls back to the default region with a warning.
pub fn resolve_endpoint(source: &impl ConfigSource) -> WebsiteEndpoint {
    let endpoint = s3site_regions::resolve(source.region_hint());
    if endpoint.fallback {
        if let Some(hint) = source.region_hint() {
            tracing::warn!(
                region = hint,
                fallback = endpoint.region,
                "unknown region, using default website endpoint"
            );
        }
    }
    endpoint
}

/// Build the distribution config for a bucket with one override tree.
pub fn build_distribution_config(
    source: &impl ConfigSource,
    overrides: &Mapping,
) -> Result<DistributionConfigDocument, BuildError> {
    build_distribution_config_layers(source, [overrides])
}

/// Build the distribution config applying override layers in order.
///
/// Later layers win. Nothing is returned unless every layer merges and the
/// result serializes.
pub fn build_distribution_config_layers<'a>(
    source: &impl ConfigSource,
    layers: impl IntoIterator<Item = &'a Mapping>,
) -> Result<DistributionConfigDocument, BuildError> {
    let bucket = source.bucket_name().trim();
    if bucket.is_empty() {
        return Err(BuildError::MissingRequiredField("bucket_name"));
    }

    let endpoint = resolve_endpoint(source);
    let domain_name = endpoint.hostname(bucket);
    tracing::debug!(bucket, region = endpoint.region, %domain_name, "resolved website endpoint");

    let mut base = default_tree().clone();
    base.set_path(CALLER_REFERENCE_PATH, default_caller_reference(bucket));
    base.set_path(ORIGIN_ID_PATH, origin_id(bucket));
    base.set_path(DOMAIN_NAME_PATH, domain_name);
    base.set_path(TARGET_ORIGIN_ID_PATH, origin_id(bucket));

    let layers = layers.into_iter().enumerate().map(|(index, layer)| {
        tracing::debug!(layer = index, keys = layer.len(), "merging override layer");
        layer
    });
    let merged = merge_layers(&base, layers)?;

    let xml = to_xml(&merged)?;
    Ok(DistributionConfigDocument { merged, xml })
}
