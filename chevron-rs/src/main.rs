use std::io::Read;
use std::process::ExitCode;

use chevron::cli::{self, ConfigFile};
use chevron::config::SessionConfig;
use chevron::script::Interpreter;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("chevron: {e}");
            eprintln!("Usage: chevron [-d] [-s] [-S] [-D<depth>] [-f[<rc>]] [-c<stmt>] [<program>]");
            return ExitCode::FAILURE;
        }
    };

    // ── Logging ───────────────────────────────────────────────────────────────
    let mut logger = env_logger::Builder::from_default_env();
    if args.debug {
        logger.filter_module("chevron", log::LevelFilter::Debug);
    }
    logger.init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let rc_path = match &args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(path) => Some(path.clone()),
        ConfigFile::Search => cli::find_rc_file(),
    };
    let mut config = match &rc_path {
        Some(path) => match SessionConfig::load_file(path) {
            Ok((config, errors)) => {
                for e in errors {
                    eprintln!("chevron: {}: {e}", path.display());
                }
                config
            }
            Err(e) => {
                eprintln!("chevron: warning: {}: {e}", path.display());
                SessionConfig::default()
            }
        },
        None => SessionConfig::default(),
    };
    args.apply_to(&mut config);
    log::debug!("session config: {config:?}");

    // ── Program source ────────────────────────────────────────────────────────
    let source = match &args.program {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("chevron: {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut s = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut s) {
                eprintln!("chevron: stdin: {e}");
                return ExitCode::FAILURE;
            }
            s
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let mut interp = Interpreter::with_config(config);
    interp.set_print_sink(|line| println!("{line}"));

    let mut result = interp.execute(&source).map(drop);
    if result.is_ok() {
        if let Some(cmd) = &args.command {
            result = interp.exec_line(cmd).map(drop);
        }
    }

    for w in interp.warnings.drain(..) {
        eprintln!("% {w}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("chevron: {e}");
            ExitCode::FAILURE
        }
    }
}
