//! Cache key construction
//!
//! Every key is a pure function of (domain, user id, optional entity id), so
//! anyone debugging cache state can rebuild a key from those parts alone:
//!
//! - `"<domain>:<user>"` for a user's full collection
//! - `"<domain>:<user>:<subresource>:<id>"` for a single entity
//! - `"<domain>:<user>:view:<name>"` for an aggregated projection

use std::fmt;

/// Cache namespaces, one per domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheDomain {
    Library,
    Digital,
    Physical,
    Sublocation,
    Dashboard,
}

impl CacheDomain {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Digital => "digital",
            Self::Physical => "physical",
            Self::Sublocation => "sublocation",
            Self::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Segment reserved for view keys
const VIEW_SEGMENT: &str = "view";

/// Deterministic cache key builder
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheKeys;

impl CacheKeys {
    /// Key for a user's full collection in `domain`
    pub fn collection(domain: CacheDomain, user_id: &str) -> String {
        format!("{}:{}", domain.prefix(), escape_segment(user_id))
    }

    /// Key for a single entity
    pub fn entity(domain: CacheDomain, user_id: &str, subresource: &str, entity_id: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            domain.prefix(),
            escape_segment(user_id),
            subresource,
            escape_segment(entity_id)
        )
    }

    /// Key for an aggregated (BFF) projection of a user's collection
    pub fn view(domain: CacheDomain, user_id: &str, view: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            domain.prefix(),
            escape_segment(user_id),
            VIEW_SEGMENT,
            view
        )
    }
}

/// Escapes the separator so caller-supplied ids can't forge extra segments
fn escape_segment(segment: &str) -> String {
    if !segment.contains([':', '%']) {
        return segment.to_string();
    }

    let mut escaped = String::with_capacity(segment.len() + 4);

    for c in segment.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            other => escaped.push(other),
        }
    }

    escaped
}
