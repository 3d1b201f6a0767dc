//! CLI command definitions for multiprops
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{
    DirLocator, ProcessEnvironment, ResourceRoots, SourceId, SourceLoader, parse_all,
};
use crate::format::OutputFormat;
use crate::logging::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding a tracing filter directive for the CLI.
pub const LOG_FILTER_ENV: &str = "MULTIPROPS_LOG";

/// Resolve and inspect layered properties configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Resource root directory (repeatable; overrides MULTIPROPS_RESOURCE_PATH)
    #[arg(short, long = "root", global = true)]
    pub roots: Vec<PathBuf>,

    /// Lowest-precedence source to add (repeatable)
    #[arg(long = "default", global = true)]
    pub defaults: Vec<String>,

    /// Highest-precedence source to add (repeatable)
    #[arg(long = "preempt", global = true)]
    pub preempting: Vec<String>,

    /// Only take ambient settings from environment variables with this
    /// prefix, translating `PREFIX_A__B` to `a.b`
    #[arg(long, global = true)]
    pub env_prefix: Option<String>,

    /// Enable verbose logging, including per-source trace diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Properties, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every effective property (default if no subcommand given)
    Show,

    /// Print the effective value of one key
    Get {
        /// Exact key, e.g. `db.pool.size`
        key: String,
    },

    /// Print effective properties under a dotted prefix
    Prefix {
        /// Prefix without the trailing dot, e.g. `db.pool`
        prefix: String,
    },

    /// Print the properties exactly as loaded from one source
    Source {
        /// Source identifier, e.g. `/app.properties` or `yaml:/app.yaml`
        id: String,
    },

    /// Print the final ordered source list
    Paths,

    /// Read an explicit source list instead of the default configuration
    Read {
        /// Source identifiers, lowest precedence first
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl Cli {
    /// Resource roots from `--root`, or discovered.
    pub fn resource_roots(&self) -> ResourceRoots {
        if self.roots.is_empty() {
            ResourceRoots::discover()
        } else {
            ResourceRoots::with_dirs(self.roots.iter().cloned())
        }
    }

    /// Source loader configured from the command line.
    pub fn source_loader(&self) -> SourceLoader {
        let ambient = match self.env_prefix {
            Some(ref prefix) => ProcessEnvironment::with_prefix(prefix.clone()),
            None => ProcessEnvironment::new(),
        };
        SourceLoader::new(DirLocator::new(self.resource_roots())).with_ambient(ambient)
    }

    /// Sources from `--default`, lowest precedence first.
    pub fn default_ids(&self) -> Vec<SourceId> {
        parse_all(&self.defaults)
    }

    /// Sources from `--preempt`, lowest precedence first.
    pub fn preempting_ids(&self) -> Vec<SourceId> {
        parse_all(&self.preempting)
    }

    /// Lowest level of resolution diagnostics worth replaying.
    pub fn diagnostic_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Trace
        } else {
            LogLevel::Debug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["multiprops"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
        assert_eq!(cli.format, OutputFormat::Properties);
        assert!(!cli.verbose);
        assert_eq!(cli.diagnostic_level(), LogLevel::Debug);
    }

    #[test]
    fn test_verbose_replays_trace_diagnostics() {
        let cli = Cli::parse_from(["multiprops", "paths", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.diagnostic_level(), LogLevel::Trace);
    }

    #[test]
    fn test_parse_repeatable_sources() {
        let cli = Cli::parse_from([
            "multiprops",
            "--default",
            "/a.properties",
            "--default",
            "/b.properties",
            "--preempt",
            "yaml:/c.yaml",
            "get",
            "db.url",
        ]);
        assert_eq!(
            cli.default_ids(),
            vec![SourceId::parse("/a.properties"), SourceId::parse("/b.properties")]
        );
        assert_eq!(cli.preempting_ids(), vec![SourceId::formatted("yaml", "/c.yaml")]);
        match cli.command {
            Some(Command::Get { ref key }) => assert_eq!(key, "db.url"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_roots_override_discovery() {
        let cli = Cli::parse_from(["multiprops", "--root", "/etc/app", "-r", "/opt/app", "paths"]);
        assert_eq!(
            cli.resource_roots(),
            ResourceRoots::with_dirs([PathBuf::from("/etc/app"), PathBuf::from("/opt/app")])
        );
    }

    #[test]
    fn test_read_requires_ids() {
        assert!(Cli::try_parse_from(["multiprops", "read"]).is_err());
        let cli =
            Cli::try_parse_from(["multiprops", "--format", "json", "read", "/a", "/"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
