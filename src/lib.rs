//! s3site - serve S3 static websites through CloudFront
//!
//! This crate builds the CloudFront `DistributionConfig` document for an S3
//! website bucket: built-in defaults, the bucket's regional website endpoint
//! as origin, and the user's overrides deep-merged on top.

pub mod config;
pub mod distribution;

pub use config::{BucketSite, ConfigSource, Mapping, SiteConfig, Value};
pub use distribution::{
    build_distribution_config, build_distribution_config_layers, BuildError,
    DistributionConfigDocument,
};
pub use s3site_regions as regions;
