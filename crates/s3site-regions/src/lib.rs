//! S3 static website endpoints by region.
//!
//! S3 serves website buckets from a region-specific hostname. The naming is
//! not uniform: older regions use `s3-website-<region>` while newer ones use
//! `s3-website.<region>`, so the suffixes are kept as literals.

use serde::Serialize;

/// Region used when no (or an unknown) region is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Website endpoint suffix of [`DEFAULT_REGION`].
const DEFAULT_SUFFIX: &str = "s3-website-us-east-1.amazonaws.com";

/// Known regions and their website endpoint suffixes.
const WEBSITE_ENDPOINTS: &[(&str, &str)] = &[
    ("us-east-1", "s3-website-us-east-1.amazonaws.com"),
    ("us-west-1", "s3-website-us-west-1.amazonaws.com"),
    ("us-west-2", "s3-website-us-west-2.amazonaws.com"),
    ("ap-south-1", "s3-website.ap-south-1.amazonaws.com"),
    ("ap-northeast-2", "s3-website.ap-northeast-2.amazonaws.com"),
    ("ap-southeast-1", "s3-website-ap-southeast-1.amazonaws.com"),
    ("ap-southeast-2", "s3-website-ap-southeast-2.amazonaws.com"),
    ("ap-northeast-1", "s3-website-ap-northeast-1.amazonaws.com"),
    ("eu-central-1", "s3-website.eu-central-1.amazonaws.com"),
    ("eu-west-1", "s3-website-eu-west-1.amazonaws.com"),
    ("sa-east-1", "s3-website-sa-east-1.amazonaws.com"),
];

/// A resolved website endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebsiteEndpoint {
    /// Region code the suffix belongs to.
    pub region: &'static str,

    /// Hostname suffix appended to the bucket name.
    pub suffix: &'static str,

    /// True when the requested region was absent or unknown and
    /// [`DEFAULT_REGION`] was used instead.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl WebsiteEndpoint {
    /// Full website hostname for a bucket.
    pub fn hostname(&self, bucket: &str) -> String {
        format!("{}.{}", bucket, self.suffix)
    }
}

fn lookup(region: &str) -> Option<WebsiteEndpoint> {
    WEBSITE_ENDPOINTS
        .iter()
        .find(|(code, _)| *code == region)
        .map(|&(region, suffix)| WebsiteEndpoint {
            region,
            suffix,
            fallback: false,
        })
}

/// Look up the website endpoint suffix of a known region.
pub fn website_endpoint(region: &str) -> Option<&'static str> {
    lookup(region).map(|endpoint| endpoint.suffix)
}

/// Check whether a region code is in the table.
pub fn is_known_region(region: &str) -> bool {
    website_endpoint(region).is_some()
}

/// Resolve a region hint, falling back to [`DEFAULT_REGION`].
///
/// Never fails: an absent, empty or unrecognized hint resolves to the
/// default region's endpoint with `fallback` set.
pub fn resolve(region_hint: Option<&str>) -> WebsiteEndpoint {
    region_hint.and_then(lookup).unwrap_or(WebsiteEndpoint {
        region: DEFAULT_REGION,
        suffix: DEFAULT_SUFFIX,
        fallback: true,
    })
}

/// Origin domain name of a bucket's website endpoint.
pub fn origin_domain_name(region_hint: Option<&str>, bucket: &str) -> String {
    resolve(region_hint).hostname(bucket)
}

/// All known endpoints in table order.
pub fn endpoints() -> impl Iterator<Item = WebsiteEndpoint> {
    WEBSITE_ENDPOINTS
        .iter()
        .map(|&(region, suffix)| WebsiteEndpoint {
            region,
            suffix,
            fallback: false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions() {
        let cases = [
            ("us-east-1", "s3-website-us-east-1.amazonaws.com"),
            ("us-west-1", "s3-website-us-west-1.amazonaws.com"),
            ("us-west-2", "s3-website-us-west-2.amazonaws.com"),
            ("ap-south-1", "s3-website.ap-south-1.amazonaws.com"),
            ("ap-northeast-2", "s3-website.ap-northeast-2.amazonaws.com"),
            ("ap-southeast-1", "s3-website-ap-southeast-1.amazonaws.com"),
            ("ap-southeast-2", "s3-website-ap-southeast-2.amazonaws.com"),
            ("ap-northeast-1", "s3-website-ap-northeast-1.amazonaws.com"),
            ("eu-central-1", "s3-website.eu-central-1.amazonaws.com"),
            ("eu-west-1", "s3-website-eu-west-1.amazonaws.com"),
            ("sa-east-1", "s3-website-sa-east-1.amazonaws.com"),
        ];

        for (region, suffix) in cases {
            assert_eq!(
                origin_domain_name(Some(region), "test-bucket"),
                format!("test-bucket.{}", suffix),
                "region {}",
                region
            );
        }
    }

    #[test]
    fn test_dot_separator_preserved() {
        assert_eq!(
            website_endpoint("ap-south-1"),
            Some("s3-website.ap-south-1.amazonaws.com")
        );
        assert_eq!(
            website_endpoint("ap-southeast-1"),
            Some("s3-website-ap-southeast-1.amazonaws.com")
        );
    }

    #[test]
    fn test_absent_hint_falls_back() {
        let endpoint = resolve(None);
        assert!(endpoint.fallback);
        assert_eq!(endpoint.region, DEFAULT_REGION);
        assert_eq!(
            origin_domain_name(None, "test-bucket"),
            "test-bucket.s3-website-us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_unknown_hint_falls_back() {
        for hint in ["", "mars-north-1", "EU-WEST-1", "eu-west-1 "] {
            let endpoint = resolve(Some(hint));
            assert!(endpoint.fallback, "hint {:?}", hint);
            assert_eq!(endpoint.suffix, "s3-website-us-east-1.amazonaws.com");
        }
    }

    #[test]
    fn test_fallback_matches_default_region_entry() {
        assert_eq!(
            website_endpoint(DEFAULT_REGION),
            Some(resolve(None).suffix)
        );
    }

    #[test]
    fn test_explicit_default_region_is_not_fallback() {
        assert!(!resolve(Some("us-east-1")).fallback);
    }

    #[test]
    fn test_endpoints_listing() {
        let all: Vec<_> = endpoints().collect();
        assert_eq!(all.len(), 11);
        assert_eq!(all[0].region, "us-east-1");
        assert_eq!(all[10].region, "sa-east-1");
        assert!(all.iter().all(|e| is_known_region(e.region)));
    }

    #[test]
    fn test_endpoint_serialization() {
        let json = serde_json::to_value(resolve(Some("eu-west-1"))).unwrap();
        assert_eq!(json["region"], "eu-west-1");
        assert_eq!(json["suffix"], "s3-website-eu-west-1.amazonaws.com");
        assert!(json.get("fallback").is_none());

        let json = serde_json::to_value(resolve(None)).unwrap();
        assert_eq!(json["fallback"], true);
    }
}
