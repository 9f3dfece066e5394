//! Mt Library
//!
//! Evaluation core of SML, a small interactive mathematics language, plus
//! the lexer, parser, extension loader and REPL that front it.

pub mod ast;
pub mod config;
pub mod error;
pub mod ext;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::{Program, Span};
pub use config::Config;
pub use error::{CompileError, Result};
pub use interp::{EvalError, EvalResult, Registry, RegistryBuilder, Session, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=mt=debug mt run script.sml`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Lex and parse a source string
pub fn parse_source(filename: &str, source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    parser::parse(filename, source, tokens)
}

/// Build the registry for a configuration: core built-ins, then every
/// discovered or requested extension package
pub fn build_registry(config: &Config) -> Result<std::sync::Arc<Registry>> {
    let mut builder = RegistryBuilder::with_core();
    ext::load_all(config.extension_dir.as_deref(), &config.extensions, &mut builder)?;
    Ok(builder.freeze())
}
