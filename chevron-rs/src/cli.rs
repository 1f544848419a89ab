//! Command-line argument parsing.
//!
//! Usage:
//!   chevron [-d] [-s] [-S] [-D<depth>] [-f[<rc>]] [-c<stmt>] [<program>]

use std::path::PathBuf;

use crate::config::{parse_depth, ScopeMode, SessionConfig};

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// rc-file specification.
    pub config: ConfigFile,
    /// Statement to run after the program, in the same session (`-c<stmt>`).
    pub command: Option<String>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Pop block scopes when their definition ends (`-s`).
    pub block_scope: bool,
    /// Record unresolved routes as warnings (`-S`).
    pub strict: bool,
    /// Dispatch depth limit (`-D<n>`).
    pub max_depth: Option<usize>,
    /// Program file; stdin when absent.
    pub program: Option<PathBuf>,
}

/// How to choose the rc file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// `$CHEVRONRC`, then the user config dir, then `./.chevronrc` (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip the rc file.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

impl CliArgs {
    /// Overlay the command-line switches on a loaded configuration.
    pub fn apply_to(&self, config: &mut SessionConfig) {
        if self.block_scope {
            config.scope_mode = ScopeMode::Block;
        }
        if self.strict {
            config.strict_routes = true;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                's' => args.block_scope = true,
                'S' => args.strict = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') && positional_follows(argv, i + 1) {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -c<stmt>
                'c' => {
                    let cmd = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-c requires a statement argument".to_owned());
                    };
                    args.command = Some(cmd);
                }

                // -D<depth>
                'D' => {
                    let raw = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-D requires a depth argument".to_owned());
                    };
                    let depth = parse_depth(&raw).map_err(|e| format!("-D: {e}"))?;
                    args.max_depth = Some(depth);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => args.program = positional.pop().map(PathBuf::from),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

/// `-f <file>` only takes the next word when a program path can still follow
/// it; `chevron -f prog.chev` means "skip the rc file, run prog.chev".
fn positional_follows(argv: &[String], next: usize) -> bool {
    argv[next + 1..].iter().any(|a| !a.starts_with('-'))
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the rc file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_rc_file() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(p) = std::env::var("CHEVRONRC") {
        candidates.push(PathBuf::from(p));
    }
    if let Some(dirs) = directories::BaseDirs::new() {
        candidates.push(dirs.config_dir().join("chevron").join("chevronrc"));
    }
    candidates.push(PathBuf::from("./.chevronrc"));
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
