//! Test utilities for ontograph
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] installs a test-friendly tracing subscriber once
//! - [`GraphFixture`] builds small graphs in a fresh in-memory store
//! - [`TemplateFixture`] is a ready-made three-worksheet template
//!
//! # Example
//!
//! ```rust,no_run
//! use ontograph::test_utils::TemplateFixture;
//!
//! let TemplateFixture { fixture, root, .. } = TemplateFixture::build();
//! let template = fixture.template(root).unwrap();
//! assert_eq!(template.worksheets().len(), 3);
//! ```

pub mod fixtures;

pub use fixtures::{GraphFixture, TemplateFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honored, and without it no subscriber is installed.
///
/// ```bash
/// RUST_LOG=ontograph=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
