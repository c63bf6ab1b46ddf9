//! Property-name pattern matching
//!
//! A [`PatternMap`] is a trie over dotted property-name segments with a
//! wildcard child per node. Map-valued members register patterns containing
//! the wildcard segment `{*}`, which matches exactly one arbitrary segment
//! (the dynamic map key).

use std::collections::BTreeMap;
use tracing::warn;

/// Segment matching exactly one arbitrary key.
pub const WILDCARD_SEGMENT: &str = "{*}";

#[derive(Debug, Clone)]
pub struct PatternMap<T> {
    matched: Option<T>,
    children: BTreeMap<String, PatternMap<T>>,
    wildcard: Option<Box<PatternMap<T>>>,
}

impl<T> Default for PatternMap<T> {
    fn default() -> Self {
        PatternMap {
            matched: None,
            children: BTreeMap::new(),
            wildcard: None,
        }
    }
}

impl<T> PatternMap<T> {
    pub fn new() -> Self {
        PatternMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_none() && self.children.is_empty() && self.wildcard.is_none()
    }

    /// Register a pattern; empty segments are ignored, so an empty pattern
    /// registers at the root node.
    pub fn add_pattern(&mut self, pattern: &str, value: T) {
        let mut node = self;
        for segment in pattern.split('.').filter(|s| !s.is_empty()) {
            node = if segment == WILDCARD_SEGMENT {
                node.wildcard.get_or_insert_with(Box::default)
            } else {
                node.children.entry(segment.to_string()).or_default()
            };
        }
        node.matched = Some(value);
    }

    /// Match a concrete property name; exact segments win over wildcards.
    pub fn find(&self, name: &str) -> Option<&T> {
        let segments: Vec<&str> = name.split('.').filter(|s| !s.is_empty()).collect();
        self.find_segments(&segments)
    }

    fn find_segments(&self, segments: &[&str]) -> Option<&T> {
        let Some((head, rest)) = segments.split_first() else {
            return self.matched.as_ref();
        };
        if let Some(child) = self.children.get(*head) {
            if let Some(found) = child.find_segments(rest) {
                return Some(found);
            }
        }
        self.wildcard
            .as_ref()
            .and_then(|wildcard| wildcard.find_segments(rest))
    }

    /// Match a property name, warning about unrecognized keys.
    pub fn match_or_warn(&self, name: &str) -> Option<&T> {
        let found = self.find(name);
        if found.is_none() {
            warn!(key = %name, "unrecognized configuration key provided");
        }
        found
    }

    /// All registered patterns with their payloads, in lexicographic order
    /// with wildcard children last.
    pub fn entries(&self) -> Vec<(String, &T)> {
        let mut out = Vec::new();
        self.collect_entries(&mut Vec::new(), &mut out);
        out
    }

    fn collect_entries<'a>(&'a self, path: &mut Vec<String>, out: &mut Vec<(String, &'a T)>) {
        if let Some(value) = &self.matched {
            out.push((path.join("."), value));
        }
        for (segment, child) in &self.children {
            path.push(segment.clone());
            child.collect_entries(path, out);
            path.pop();
        }
        if let Some(wildcard) = &self.wildcard {
            path.push(WILDCARD_SEGMENT.to_string());
            wildcard.collect_entries(path, out);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let mut map = PatternMap::new();
        map.add_pattern("quarkus.http.port", 1);
        map.add_pattern("quarkus.http.host", 2);
        assert_eq!(map.find("quarkus.http.port"), Some(&1));
        assert_eq!(map.find("quarkus.http.host"), Some(&2));
        assert_eq!(map.find("quarkus.http"), None);
        assert_eq!(map.find("quarkus.http.port.extra"), None);
    }

    #[test]
    fn test_wildcard_match() {
        let mut map = PatternMap::new();
        map.add_pattern("quarkus.log.category.{*}.level", 1);
        assert_eq!(map.find("quarkus.log.category.io.level"), Some(&1));
        assert_eq!(map.find("quarkus.log.category.level"), None);
    }

    #[test]
    fn test_exact_segment_wins_over_wildcard() {
        let mut map = PatternMap::new();
        map.add_pattern("quarkus.db.{*}.url", 1);
        map.add_pattern("quarkus.db.default.url", 2);
        assert_eq!(map.find("quarkus.db.default.url"), Some(&2));
        assert_eq!(map.find("quarkus.db.other.url"), Some(&1));
    }

    #[test]
    fn test_match_or_warn_returns_none_for_unknown() {
        let mut map = PatternMap::new();
        map.add_pattern("quarkus.http.port", 1);
        assert!(map.match_or_warn("quarkus.http.bogus").is_none());
        assert_eq!(map.match_or_warn("quarkus.http.port"), Some(&1));
    }

    #[test]
    fn test_entries() {
        let mut map = PatternMap::new();
        map.add_pattern("quarkus.http.port", 1);
        map.add_pattern("quarkus.http.headers.{*}", 2);
        let entries = map.entries();
        let patterns: Vec<&str> = entries.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(patterns, ["quarkus.http.headers.{*}", "quarkus.http.port"]);
    }
}
