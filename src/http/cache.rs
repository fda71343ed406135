//! HTTP cache control module
//!
//! The server never caches content itself; it only hands clients a
//! `Cache-Control` value taken from configuration.

use serde::Deserialize;

/// Cache control policy attached to every delivered file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CachePolicy {
    /// Bare `max-age` directive (seconds)
    MaxAge(u32),
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// Private cache (browser cache only)
    Private(u32),
    /// No cache
    NoCache,
    /// No store
    NoStore,
    /// Any other directive list, passed through verbatim
    Custom(String),
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(&self) -> String {
        match self {
            Self::MaxAge(max_age) => format!("max-age={max_age}"),
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::Private(max_age) => format!("private, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
            Self::NoStore => "no-store".to_string(),
            Self::Custom(value) => value.clone(),
        }
    }
}

impl From<String> for CachePolicy {
    fn from(value: String) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        let directives: Vec<&str> = normalized.split(',').map(str::trim).collect();

        match directives.as_slice() {
            ["no-cache"] => Self::NoCache,
            ["no-store"] => Self::NoStore,
            [age] => parse_max_age(age).map_or(Self::Custom(value), Self::MaxAge),
            ["public", age] => parse_max_age(age).map_or(Self::Custom(value), Self::Public),
            ["private", age] => parse_max_age(age).map_or(Self::Custom(value), Self::Private),
            _ => Self::Custom(value),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::MaxAge(3600) // 1 hour
    }
}

fn parse_max_age(directive: &str) -> Option<u32> {
    directive.strip_prefix("max-age=")?.trim().parse().ok()
}
