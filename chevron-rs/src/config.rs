//! Session configuration and the rc-file loader.
//!
//! The rc file is a list of `key = value` lines:
//!
//! | Key         | Values                      | Effect                                  |
//! |-------------|-----------------------------|-----------------------------------------|
//! | `scope`     | `leak` \| `block`           | [`SessionConfig::scope_mode`]           |
//! | `max_depth` | integer, 0 to 1024          | [`SessionConfig::max_depth`]            |
//! | `strict`    | `true` `false` `1` `0` `on` `off` | [`SessionConfig::strict_routes`]  |
//! | `#…`        |                             | comment, ignored                        |
//!
//! Bad lines are reported as [`ConfigError`]s and skipped; the rest of the
//! file still applies.

use std::path::Path;

/// Default bound on nested dispatch.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Hard ceiling on `max_depth`; deeper dispatch chains overflow the native
/// stack before they would hit a larger limit.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// A non-fatal error encountered while loading an rc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Lifetime of the scope a block pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeMode {
    /// Block scopes stay live for the rest of the session.
    #[default]
    Leak,
    /// A block's scope is popped once its definition has been processed.
    Block,
}

/// Tunables for one interpreter session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub scope_mode: ScopeMode,
    /// Maximum nesting of dispatches before
    /// [`ScriptError::RecursionLimitExceeded`](crate::script::ScriptError).
    pub max_depth: usize,
    /// Record unresolved routes as warnings instead of only tracing them.
    pub strict_routes: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            scope_mode: ScopeMode::Leak,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_routes: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an rc file's contents on top of the defaults.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = SessionConfig::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                errors.push(ConfigError {
                    line: lineno,
                    message: format!("expected `key = value`, got `{line}`"),
                });
                continue;
            };
            if let Err(message) = config.apply(key.trim(), value.trim()) {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse an rc file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Apply one setting.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "scope" => {
                self.scope_mode = match value {
                    "leak" => ScopeMode::Leak,
                    "block" => ScopeMode::Block,
                    other => return Err(format!("scope: expected `leak` or `block`, got `{other}`")),
                };
            }
            "max_depth" => {
                self.max_depth = parse_depth(value).map_err(|e| format!("max_depth: {e}"))?;
            }
            "strict" => {
                self.strict_routes = parse_bool(value)
                    .ok_or_else(|| format!("strict: expected a boolean, got `{value}`"))?;
            }
            other => return Err(format!("unknown setting `{other}`")),
        }
        Ok(())
    }
}

/// Parse a dispatch depth, rejecting values above [`MAX_DEPTH_LIMIT`].
pub fn parse_depth(s: &str) -> Result<usize, String> {
    let depth: usize = s.parse().map_err(|_| format!("invalid number `{s}`"))?;
    if depth > MAX_DEPTH_LIMIT {
        return Err(format!("{depth} exceeds the limit of {MAX_DEPTH_LIMIT}"));
    }
    Ok(depth)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
