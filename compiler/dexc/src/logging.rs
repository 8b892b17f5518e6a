//! Tracing setup for the `dexc` binary.
//!
//! `DEX_LOG` holds an `EnvFilter` directive (`DEX_LOG=dex_ctfe=debug`).
//! `DEX_LOG_STYLE=tree` prints nested spans as a tree, which suits the
//! recursive resolver and interpreter; anything else prints flat lines.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the subscriber once, and only when `DEX_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let Ok(directives) = std::env::var("DEX_LOG") else {
            return;
        };
        let filter = EnvFilter::new(directives);
        let tree = std::env::var("DEX_LOG_STYLE").is_ok_and(|style| style == "tree");
        if tree {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
