//! Placeholder substitution.
//!
//! Route templates may contain two kinds of placeholder:
//!
//! | Placeholder | Replaced by                                              |
//! |-------------|----------------------------------------------------------|
//! | `argN`      | The Nth argument of the call being dispatched, or `""`   |
//! | `@name`     | `name` resolved against the scope stack, or `none`       |
//!
//! A variable name is a run of word characters (Unicode letters, digits,
//! `_`) and `-`.
//!
//! Argument substitution runs first, then variable substitution.  Each pass
//! is a single left-to-right replacement: text produced by a replacement is
//! never scanned again within the same pass.
//!
//! Substitution is applied per segment, so a value that itself contains
//! `>` stays inside the segment it was substituted into.  When an `@name`
//! fills a whole segment, text values that would read back as something
//! else (`"007"` as an integer, say) are written quoted.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::scope::ScopeStack;
use super::stmt::Statement;

fn arg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\barg([0-9]+)\b").expect("static regex"))
}

fn var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([\w-]+)").expect("static regex"))
}

/// Replace every `argN` with `args[N]` (empty when out of range).
pub fn substitute_args(text: &str, args: &[String]) -> String {
    arg_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| args.get(n))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Replace every `@name` with its value from `scopes` (`none` when unbound).
pub fn substitute_vars(text: &str, scopes: &ScopeStack) -> String {
    var_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let value = scopes.resolve(&caps[1]);
            if caps[0].len() == text.len() {
                value.to_segment()
            } else {
                value.to_string()
            }
        })
        .into_owned()
}

/// Both passes, arguments first.
pub fn substitute(text: &str, args: &[String], scopes: &ScopeStack) -> String {
    substitute_vars(&substitute_args(text, args), scopes)
}

/// Rewrite a route template into the statement to dispatch next.
///
/// Returns `None` only for an empty template.
pub fn rewrite(template: &[String], args: &[String], scopes: &ScopeStack) -> Option<Statement> {
    let segments = template
        .iter()
        .map(|seg| substitute(seg, args, scopes))
        .collect();
    let stmt = Statement::from_segments(segments);
    log::trace!(
        "rewrite [{}] with {:?} -> {}",
        template.join(" > "),
        args,
        stmt.as_ref().map(ToString::to_string).unwrap_or_default()
    );
    stmt
}

// ── Tests ─────────────────────────────────────────────────────────────────────
