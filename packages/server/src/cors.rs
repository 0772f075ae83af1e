//! Cross-origin allow-list.
//!
//! Patterns are either exact origins (`https://example.com`) or single-level
//! wildcards (`https://*.vercel.app`), which match one subdomain label and
//! nothing deeper. Requests without an `Origin` header (same-origin, curl)
//! always pass.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Clone, Default)]
pub struct OriginMatcher {
    exact: Vec<String>,
    wildcards: Vec<WildcardPattern>,
}

#[derive(Debug, Clone)]
struct WildcardPattern {
    /// Scheme prefix, e.g. `https://`
    prefix: String,
    /// Domain suffix including the leading dot, e.g. `.vercel.app`
    suffix: String,
}

impl OriginMatcher {
    pub fn new(patterns: &[String]) -> Self {
        let mut matcher = Self::default();
        for pattern in patterns {
            match pattern.split_once("*.") {
                Some((prefix, suffix)) if prefix.ends_with("://") => {
                    matcher.wildcards.push(WildcardPattern {
                        prefix: prefix.to_string(),
                        suffix: format!(".{}", suffix),
                    });
                }
                _ => matcher.exact.push(pattern.clone()),
            }
        }
        matcher
    }

    pub fn allows(&self, origin: &str) -> bool {
        if self.exact.iter().any(|o| o == origin) {
            return true;
        }
        self.wildcards.iter().any(|w| w.matches(origin))
    }
}

impl WildcardPattern {
    fn matches(&self, origin: &str) -> bool {
        let Some(rest) = origin.strip_prefix(&self.prefix) else {
            return false;
        };
        let Some(label) = rest.strip_suffix(&self.suffix) else {
            return false;
        };
        // exactly one subdomain label: non-empty, no dots, no path
        !label.is_empty() && !label.contains('.') && !label.contains('/')
    }
}

/// CORS headers for the intake API. The hard 403 enforcement happens in a
/// separate middleware; this layer only shapes preflight and response
/// headers for allowed origins.
pub fn cors_layer(matcher: OriginMatcher) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts| {
                origin.to_str().map(|o| matcher.allows(o)).unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> OriginMatcher {
        OriginMatcher::new(&[
            "https://example.com".to_string(),
            "https://*.vercel.app".to_string(),
        ])
    }

    #[test]
    fn test_exact_origin_allowed() {
        assert!(matcher().allows("https://example.com"));
        assert!(!matcher().allows("https://example.org"));
        assert!(!matcher().allows("http://example.com"));
    }

    #[test]
    fn test_wildcard_matches_single_label() {
        let m = matcher();
        assert!(m.allows("https://preview-abc123.vercel.app"));
        assert!(m.allows("https://my-site.vercel.app"));
    }

    #[test]
    fn test_wildcard_rejects_nested_and_bare() {
        let m = matcher();
        assert!(!m.allows("https://a.b.vercel.app"));
        assert!(!m.allows("https://vercel.app"));
        assert!(!m.allows("http://preview.vercel.app"));
        assert!(!m.allows("https://evil.com/?x=.vercel.app"));
    }
}
