//! CloudFront distribution config documents
//!
//! Builds the `DistributionConfig` document for an S3 website origin from
//! the built-in defaults, the bucket's website endpoint and user overrides.

mod builder;
mod rendered;
pub mod xml;

pub use builder::{
    build_distribution_config, build_distribution_config_layers, default_caller_reference,
    origin_id, resolve_endpoint, BuildError, DistributionConfigDocument,
};
pub use rendered::{OverrideOrigin, OverrideSource, RenderedDistribution, SCHEMA_ID};
pub use xml::{from_xml, to_xml, XmlError, ROOT_ELEMENT, XML_NAMESPACE};
