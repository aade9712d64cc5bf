//! Override key spelling
//!
//! Override files are written with lower_snake_case keys while the
//! CloudFront document uses PascalCase element names with upper-case
//! acronyms. Both spellings name the same field.

/// Element names that the segment rule cannot produce.
const ELEMENT_NAMES: &[(&str, &str)] = &[
    ("acm_certificate_arn", "ACMCertificateArn"),
    ("cname", "CNAME"),
    ("default_ttl", "DefaultTTL"),
    ("http_port", "HTTPPort"),
    ("http_version", "HttpVersion"),
    ("https_port", "HTTPSPort"),
    ("iam_certificate_id", "IAMCertificateId"),
    ("is_ipv6_enabled", "IsIPV6Enabled"),
    ("max_ttl", "MaxTTL"),
    ("min_ttl", "MinTTL"),
    ("s3_origin_config", "S3OriginConfig"),
    ("ssl_support_method", "SSLSupportMethod"),
    ("web_acl_id", "WebACLId"),
];

/// Spelling-independent identity of a field name.
///
/// `min_TTL`, `min_ttl` and `MinTTL` all map to `minttl`.
pub fn field_identity(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Document element name for a caller-facing key.
pub fn element_name(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    if let Some((_, name)) = ELEMENT_NAMES.iter().find(|(k, _)| *k == lower) {
        return (*name).to_string();
    }

    key.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
