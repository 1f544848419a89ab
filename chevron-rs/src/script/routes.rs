//! Route table.
//!
//! A route is an unprocessed template (the chevron segments after the key)
//! stored under `target.key`.  Keys of the form `argN` do not name an
//! action: they are deferred routes, matched only when an exact lookup fails
//! and the call's Nth argument equals the dispatched action.
//!
//! Definitions are last-write-wins.  The table is only mutated while blocks
//! are being processed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// What a route key matches against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutePattern {
    /// A literal action name.
    Exact(String),
    /// `argN`: matches when argument N equals the dispatched action.
    PositionalEquals(usize),
}

impl RoutePattern {
    /// Classify a route key from a block line.
    pub fn from_key(key: &str) -> RoutePattern {
        match arg_index(key) {
            Some(n) => RoutePattern::PositionalEquals(n),
            None => RoutePattern::Exact(key.to_owned()),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::Exact(action) => f.write_str(action),
            RoutePattern::PositionalEquals(n) => write!(f, "arg{n}"),
        }
    }
}

/// Parse an `argN` placeholder name into `N`.
pub fn arg_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix("arg")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Exact and deferred routes for every target.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// `"target.action"` → template.
    exact: HashMap<String, Vec<String>>,
    /// target → argument index → template.
    deferred: HashMap<String, BTreeMap<usize, Vec<String>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) the route `target.key`.  Returns the pattern the
    /// key was classified as.
    pub fn define(&mut self, target: &str, key: &str, template: Vec<String>) -> RoutePattern {
        let pattern = RoutePattern::from_key(key);
        match &pattern {
            RoutePattern::Exact(action) => {
                self.exact.insert(route_key(target, action), template);
            }
            RoutePattern::PositionalEquals(n) => {
                self.deferred.entry(target.to_owned()).or_default().insert(*n, template);
            }
        }
        pattern
    }

    /// Template for the exact route `target.action`.
    pub fn exact(&self, target: &str, action: &str) -> Option<&[String]> {
        self.exact.get(&route_key(target, action)).map(Vec::as_slice)
    }

    /// Template for the deferred route `target.argN`.
    pub fn deferred(&self, target: &str, index: usize) -> Option<&[String]> {
        self.deferred.get(target)?.get(&index).map(Vec::as_slice)
    }

    /// Look up by pattern.
    pub fn get(&self, target: &str, pattern: &RoutePattern) -> Option<&[String]> {
        match pattern {
            RoutePattern::Exact(action) => self.exact(target, action),
            RoutePattern::PositionalEquals(n) => self.deferred(target, *n),
        }
    }

    /// `true` if `target` has any deferred route.
    pub fn has_deferred(&self, target: &str) -> bool {
        self.deferred.get(target).is_some_and(|m| !m.is_empty())
    }

    /// Total number of routes, exact and deferred.
    pub fn len(&self) -> usize {
        self.exact.len() + self.deferred.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn route_key(target: &str, action: &str) -> String {
    format!("{target}.{action}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tpl(s: &[&str]) -> Vec<String> {
        s.iter().map(|&x| x.to_owned()).collect()
    }

    #[test]
    fn arg_index_parsing() {
        assert_eq!(arg_index("arg0"), Some(0));
        assert_eq!(arg_index("arg12"), Some(12));
        assert_eq!(arg_index("arg"), None);
        assert_eq!(arg_index("args"), None);
        assert_eq!(arg_index("arg1x"), None);
        assert_eq!(arg_index("xarg1"), None);
    }

    #[test]
    fn classify_keys() {
        assert_eq!(RoutePattern::from_key("true"), RoutePattern::Exact("true".into()));
        assert_eq!(RoutePattern::from_key("arg3"), RoutePattern::PositionalEquals(3));
        assert_eq!(RoutePattern::PositionalEquals(3).to_string(), "arg3");
    }

    #[test]
    fn exact_define_and_lookup() {
        let mut routes = RouteTable::new();
        routes.define("funcwithsecret", "true", tpl(&["arg0", "arg1", "@secret"]));
        assert_eq!(
            routes.exact("funcwithsecret", "true"),
            Some(&tpl(&["arg0", "arg1", "@secret"])[..])
        );
        assert_eq!(routes.exact("funcwithsecret", "false"), None);
        assert_eq!(routes.exact("other", "true"), None);
    }

    #[test]
    fn deferred_goes_to_separate_table() {
        let mut routes = RouteTable::new();
        let p = routes.define("getsecret", "arg1", tpl(&["arg1", "x"]));
        assert_eq!(p, RoutePattern::PositionalEquals(1));
        assert_eq!(routes.exact("getsecret", "arg1"), None);
        assert_eq!(routes.deferred("getsecret", 1), Some(&tpl(&["arg1", "x"])[..]));
        assert!(routes.has_deferred("getsecret"));
        assert!(!routes.has_deferred("other"));
    }

    #[test]
    fn later_definition_wins() {
        let mut routes = RouteTable::new();
        routes.define("t", "go", tpl(&["first"]));
        routes.define("t", "go", tpl(&["second"]));
        assert_eq!(routes.exact("t", "go"), Some(&tpl(&["second"])[..]));
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn len_counts_both_tables() {
        let mut routes = RouteTable::new();
        assert!(routes.is_empty());
        routes.define("t", "go", tpl(&["x"]));
        routes.define("t", "arg1", tpl(&["y"]));
        routes.define("t", "arg2", tpl(&["z"]));
        assert_eq!(routes.len(), 3);
        assert_eq!(
            routes.get("t", &RoutePattern::PositionalEquals(2)),
            Some(&tpl(&["z"])[..])
        );
    }
}
