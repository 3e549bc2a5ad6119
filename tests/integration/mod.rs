//! Integration test suite for ontograph
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **dictionary**: tag registration, serial resolution and invalidation
//! - **graph**: commit protocol across entities
//! - **traversal**: relationship queries, subclass expansion, language selection
//! - **templates**: template loading and worksheet order
//! - **cli**: the `ontograph` binary against store snapshots
//! - **config**: configuration discovery

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod config;
mod dictionary;
mod graph;
mod templates;
mod traversal;
