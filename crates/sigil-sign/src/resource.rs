//! Resource URL parsing.
//!
//! `[scheme://]domain/application_id/user_id/resource_id[/...]`

use crate::error::SignError;
use crate::schema::SEPARATOR;
use std::str::FromStr;

/// Minimum number of `/`-separated segments after the scheme.
const MIN_SEGMENTS: usize = 4;

/// The parts of a resource URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl {
    pub domain: String,

    /// Application segment, `None` when not numeric. Not checked against the
    /// issuing application.
    pub application_id: Option<u64>,

    /// User segment, `None` when not numeric.
    pub user_id: Option<u64>,

    pub resource_id: String,
}

impl ResourceUrl {
    pub fn parse(url: &str) -> Result<Self, SignError> {
        let path = strip_scheme(url);
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(SignError::MalformedResourceUrl {
                segments: segments.len(),
            });
        }

        // Empty or `&`-bearing resource ids produce tokens that can never verify.
        if segments[3].is_empty() || segments[3].contains(SEPARATOR) {
            return Err(SignError::MalformedResourceUrl {
                segments: segments.len(),
            });
        }

        Ok(Self {
            domain: segments[0].to_string(),
            application_id: segments[1].parse().ok(),
            user_id: segments[2].parse().ok(),
            resource_id: segments[3].to_string(),
        })
    }
}

impl FromStr for ResourceUrl {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn strip_scheme(url: &str) -> &str {
    match url.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !scheme.contains('/') => rest,
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url() {
        let url = ResourceUrl::parse("http://cdn.example.com/100/42/file123").unwrap();
        assert_eq!(url.domain, "cdn.example.com");
        assert_eq!(url.application_id, Some(100));
        assert_eq!(url.user_id, Some(42));
        assert_eq!(url.resource_id, "file123");
    }

    #[test]
    fn test_parse_any_scheme_and_trailing_segments() {
        let url = ResourceUrl::parse("https://cdn.example.com/1/2/abc/thumb/x.jpg").unwrap();
        assert_eq!(url.resource_id, "abc");

        let url = ResourceUrl::parse("cdn.example.com/1/2/abc").unwrap();
        assert_eq!(url.domain, "cdn.example.com");
        assert_eq!(url.resource_id, "abc");
    }

    #[test]
    fn test_non_numeric_ids_are_not_checked() {
        let url = ResourceUrl::parse("http://cdn/app/user/res").unwrap();
        assert_eq!(url.application_id, None);
        assert_eq!(url.user_id, None);
        assert_eq!(url.resource_id, "res");
    }

    #[test]
    fn test_too_few_segments() {
        let err = ResourceUrl::parse("http://cdn.example.com/100/42").unwrap_err();
        assert_eq!(err, SignError::MalformedResourceUrl { segments: 3 });

        let err: SignError = "http://cdn".parse::<ResourceUrl>().unwrap_err();
        assert_eq!(err, SignError::MalformedResourceUrl { segments: 1 });
    }

    #[test]
    fn test_empty_resource_segment() {
        let err = ResourceUrl::parse("http://cdn/1/2/").unwrap_err();
        assert!(matches!(err, SignError::MalformedResourceUrl { .. }));
    }

    #[test]
    fn test_ampersand_in_resource_segment() {
        let err = ResourceUrl::parse("http://cdn/100/42/a&b").unwrap_err();
        assert!(matches!(err, SignError::MalformedResourceUrl { .. }));
    }
}
