//! Command-line interface for ontograph.
//!
//! Every command works on a store snapshot (a JSON file written by
//! [`MemoryStore::save_to`](crate::store::MemoryStore::save_to)) and a
//! dictionary warmed from it.
//!
//! # Available Commands
//!
//! ## Dictionary
//! - `resolve` - Resolve a tag persistent identifier to its serial
//! - `definition` - Show the cached definition of a tag serial
//!
//! ## Graph
//! - `relationships` - List the nodes related to a node, grouped by predicate
//!
//! ## Templates
//! - `template` - Show the worksheets, fields and keys of a template
//! - `order` - Show the order in which template worksheets are loaded
//! - `validate` - Check workbook headers against a template
//!
//! # Examples
//!
//! ```bash
//! ontograph --store graph.json resolve crop:wheat:variety
//! ontograph --store graph.json relationships 12 --direction incoming --predicate predicate:property-of
//! ontograph --store graph.json template 1 --format json
//! ontograph --store graph.json validate 1 headers.json
//! ```
//!
//! # Configuration
//!
//! The configuration file (`~/.ontograph/config.toml` by default) sets the
//! session language, the default store snapshot and the dictionary cache
//! settings. `--config` or `ONTOGRAPH_CONFIG` point at another file.

mod common;
pub mod lookup;
pub mod relationships;
pub mod template;
pub mod validate;

pub use common::Session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::constants::CONFIG_PATH_ENV;

/// Output format shared by the commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    #[value(alias = "tree")]
    Text,

    /// Pretty-printed JSON for scripting
    Json,
}

/// Settings derived from the global flags.
///
/// Kept apart from [`Cli`] so tests can run commands without parsing
/// arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `info`
    pub log_level: Option<String>,

    /// Configuration file overriding the default location
    pub config_path: Option<PathBuf>,

    /// Store snapshot overriding the configured one
    pub store_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    ///
    /// Logs go to stderr so command output on stdout stays parseable.
    /// Installing twice is a no-op.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Open the session the commands run against.
    pub async fn open_session(&self) -> Result<Session> {
        Session::open(self.config_path.clone(), self.store_path.clone()).await
    }
}

/// Ontology graph dictionary, traversal and template tools.
#[derive(Parser, Debug)]
#[command(
    name = "ontograph",
    about = "Query an ontology graph store and the spreadsheet templates it describes",
    version,
    long_about = "ontograph resolves tag identifiers, walks graph relationships and derives \
                  spreadsheet template structure from a graph store snapshot."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.ontograph/config.toml`; a missing file means defaults.
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Store snapshot to load, overriding the `store` configuration key.
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a tag persistent identifier to its serial.
    Resolve(lookup::ResolveCommand),

    /// Show the definition of a tag serial.
    Definition(lookup::DefinitionCommand),

    /// List the nodes related to a node, grouped by predicate.
    ///
    /// `subclass-of` edges are followed transparently and never listed.
    Relationships(relationships::RelationshipsCommand),

    /// Show the worksheets, fields and keys of a template.
    Template(template::TemplateCommand),

    /// Show the order in which template worksheets are loaded.
    Order(template::OrderCommand),

    /// Check workbook headers against a template.
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Execute the parsed command line.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            store_path: self.store.clone(),
        }
    }

    /// Execute with an explicit configuration; logging is left as is.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let session = config.open_session().await?;

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&session),
            Commands::Definition(cmd) => cmd.execute(&session),
            Commands::Relationships(cmd) => cmd.execute(&session),
            Commands::Template(cmd) => cmd.execute(&session),
            Commands::Order(cmd) => cmd.execute(&session),
            Commands::Validate(cmd) => cmd.execute(&session).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_config_log_levels() {
        let cli = Cli::parse_from(["ontograph", "--verbose", "resolve", "crop:wheat"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["ontograph", "-q", "resolve", "crop:wheat"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("error"));

        let cli = Cli::parse_from(["ontograph", "--store", "graph.json", "definition", "3"]);
        let config = cli.build_config();
        assert_eq!(config.log_level, None);
        assert_eq!(config.store_path, Some(PathBuf::from("graph.json")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ontograph", "-v", "-q", "resolve", "x"]).is_err());
    }

    #[test]
    fn test_tree_is_an_alias_of_text() {
        let cli = Cli::parse_from(["ontograph", "template", "1", "--format", "tree"]);
        match cli.command {
            Commands::Template(cmd) => assert_eq!(cmd.format, OutputFormat::Text),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
