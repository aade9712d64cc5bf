//! Distribution configuration trees
//!
//! The distribution config is assembled from:
//! 1. Built-in distribution defaults
//! 2. Bucket facts (origin domain, origin id, caller reference)
//! 3. Override layers (site file, CLI assignments), last wins

mod defaults;
mod keys;
mod merge;
mod site;
mod value;

pub use defaults::{
    default_tree, DistributionDefaults, CALLER_REFERENCE_PATH, DOMAIN_NAME_PATH, ORIGIN_ID_PATH,
    TARGET_ORIGIN_ID_PATH,
};
pub use keys::{element_name, field_identity};
pub use merge::{collapse_singletons, merge_layers, merge_override, MergeError};
pub use site::{
    parse_override_assignments, BucketSite, ConfigSource, LoadedSiteConfig, SiteConfig,
    SiteConfigError, DEFAULT_SITE_FILE,
};
pub use value::{Mapping, Value};
