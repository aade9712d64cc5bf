//! Built-in distribution defaults
//!
//! Every field CloudFront requires for an S3 website origin, in the order
//! the API schema declares them.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::value::{Mapping, Value};

/// Path of the origin hostname in the distribution config
pub const DOMAIN_NAME_PATH: &[&str] = &["Origins", "Items", "Origin", "DomainName"];

/// Path of the origin id in the distribution config
pub const ORIGIN_ID_PATH: &[&str] = &["Origins", "Items", "Origin", "Id"];

/// Path of the origin the default cache behavior routes to
pub const TARGET_ORIGIN_ID_PATH: &[&str] = &["DefaultCacheBehavior", "TargetOriginId"];

/// Path of the caller reference
pub const CALLER_REFERENCE_PATH: &[&str] = &["CallerReference"];

/// Built-in default distribution values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionDefaults {
    /// Object served for requests to the root URL (default: "index.html")
    pub default_root_object: String,

    /// Distribution comment
    pub comment: String,

    /// Price class (default: "PriceClass_All")
    pub price_class: String,

    /// Viewer protocol policy (default: "allow-all")
    pub viewer_protocol_policy: String,

    /// Minimum TTL in seconds (default: "0")
    pub min_ttl: String,

    /// Forward query strings to the origin (default: "true")
    pub forward_query_string: String,

    /// Cookies forwarded to the origin (default: "all")
    pub forward_cookies: String,

    /// Protocol CloudFront uses to reach the website endpoint.
    /// S3 website endpoints only speak HTTP.
    pub origin_protocol_policy: String,

    pub http_port: String,
    pub https_port: String,
}

impl Default for DistributionDefaults {
    fn default() -> Self {
        Self {
            default_root_object: "index.html".to_string(),
            comment: "Created by s3site".to_string(),
            price_class: "PriceClass_All".to_string(),
            viewer_protocol_policy: "allow-all".to_string(),
            min_ttl: "0".to_string(),
            forward_query_string: "true".to_string(),
            forward_cookies: "all".to_string(),
            origin_protocol_policy: "http-only".to_string(),
            http_port: "80".to_string(),
            https_port: "443".to_string(),
        }
    }
}

impl DistributionDefaults {
    /// Convert to a configuration tree for merging.
    ///
    /// Bucket-specific fields (caller reference, origin id and domain) are
    /// left empty and filled in per build.
    pub fn to_tree(&self) -> Mapping {
        let origin = tree([
            ("Id", "".into()),
            ("DomainName", "".into()),
            (
                "CustomOriginConfig",
                tree([
                    ("HTTPPort", self.http_port.as_str().into()),
                    ("HTTPSPort", self.https_port.as_str().into()),
                    (
                        "OriginProtocolPolicy",
                        self.origin_protocol_policy.as_str().into(),
                    ),
                ])
                .into(),
            ),
        ]);

        let default_cache_behavior = tree([
            ("TargetOriginId", "".into()),
            (
                "TrustedSigners",
                tree([("Enabled", "false".into()), ("Quantity", "0".into())]).into(),
            ),
            (
                "ViewerProtocolPolicy",
                self.viewer_protocol_policy.as_str().into(),
            ),
            (
                "ForwardedValues",
                tree([
                    ("QueryString", self.forward_query_string.as_str().into()),
                    (
                        "Cookies",
                        tree([("Forward", self.forward_cookies.as_str().into())]).into(),
                    ),
                ])
                .into(),
            ),
            ("MinTTL", self.min_ttl.as_str().into()),
        ]);

        tree([
            ("CallerReference", "".into()),
            ("Aliases", tree([("Quantity", "0".into())]).into()),
            ("DefaultRootObject", self.default_root_object.as_str().into()),
            (
                "Origins",
                tree([
                    ("Quantity", "1".into()),
                    ("Items", tree([("Origin", origin.into())]).into()),
                ])
                .into(),
            ),
            ("DefaultCacheBehavior", default_cache_behavior.into()),
            ("CacheBehaviors", tree([("Quantity", "0".into())]).into()),
            ("Comment", self.comment.as_str().into()),
            (
                "Logging",
                tree([
                    ("Enabled", "false".into()),
                    ("IncludeCookies", "false".into()),
                    ("Bucket", "".into()),
                    ("Prefix", "".into()),
                ])
                .into(),
            ),
            ("PriceClass", self.price_class.as_str().into()),
            ("Enabled", "true".into()),
        ])
    }
}

fn tree<const N: usize>(entries: [(&str, Value); N]) -> Mapping {
    entries.into_iter().collect()
}

/// The process-wide default tree.
///
/// Built once and never mutated; builds clone it.
pub fn default_tree() -> &'static Mapping {
    static DEFAULT_TREE: OnceLock<Mapping> = OnceLock::new();
    DEFAULT_TREE.get_or_init(|| DistributionDefaults::default().to_tree())
}
