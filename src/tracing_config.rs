//! Tracing setup for the `ptrsafe` binary.
//!
//! `PTRSAFE_LOG_FORMAT` picks the output shape:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`
//! - `json`: one JSON object per event
//!
//! ```bash
//! PTRSAFE_LOG=debug ptrsafe a.json b.json
//! PTRSAFE_LOG="ptrsafe_infer=trace" PTRSAFE_LOG_FORMAT=tree ptrsafe a.json
//! ```
//!
//! Nothing is installed unless `PTRSAFE_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a `PTRSAFE_LOG_FORMAT` value; unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("PTRSAFE_LOG_FORMAT").unwrap_or_default())
    }
}

/// `PTRSAFE_LOG` wins over `RUST_LOG`; both use the `RUST_LOG` syntax.
fn build_filter() -> EnvFilter {
    match std::env::var("PTRSAFE_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber. Output goes to stderr so the JSON result
/// on stdout stays clean.
pub fn init_tracing() {
    if std::env::var("PTRSAFE_LOG").is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
