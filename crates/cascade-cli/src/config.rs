//! CLI configuration.

use cascade_core::{CascadeConfig, FanOut};
use clap::{Parser, ValueEnum};

/// Which scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Create users with nested parent and children payloads.
    Create,
    /// Create, then delete everything, cascading into `parent`.
    DeleteAll,
    /// Create users 1-3, then delete user 2 cascading into `children`.
    DeleteById,
    /// Run every scenario on a fresh store each.
    All,
}

impl Scenario {
    /// Scenarios this selection expands to.
    pub fn expand(self) -> Vec<Scenario> {
        match self {
            Scenario::All => vec![Scenario::Create, Scenario::DeleteAll, Scenario::DeleteById],
            other => vec![other],
        }
    }

    /// Scenario name as used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Create => "create",
            Scenario::DeleteAll => "delete-all",
            Scenario::DeleteById => "delete-by-id",
            Scenario::All => "all",
        }
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "cascade-cli")]
#[command(about = "Run cascading create/delete scenarios against an in-memory store")]
#[command(version)]
pub struct Args {
    /// Scenario to run.
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    pub scenario: Scenario,

    /// Dispatch relation branches one at a time.
    #[arg(long)]
    pub sequential: bool,

    /// Log every created row with the input it matched.
    #[arg(long)]
    pub log_matches: bool,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Scenarios to run, in order.
    pub scenarios: Vec<Scenario>,
    /// Engine configuration.
    pub cascade: CascadeConfig,
    /// Pretty-print output.
    pub pretty: bool,
}

impl Args {
    /// Convert arguments into a configuration.
    pub fn into_config(self) -> CliConfig {
        let fan_out = if self.sequential {
            FanOut::Sequential
        } else {
            FanOut::Concurrent
        };

        let mut cascade = CascadeConfig::new().with_fan_out(fan_out);
        if self.log_matches {
            cascade = cascade.with_match_logging();
        }

        CliConfig {
            scenarios: self.scenario.expand(),
            cascade,
            pretty: self.pretty,
        }
    }
}
