//! CLI command definitions and handlers.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mga_core::HostAndPort;
use mga_graph::GraphConfig;
use mga_wildfly::WildFlyConfig;

pub mod analyze;
pub mod status;

/// Default bolt port of Neo4j.
const NEO4J_PORT: u16 = 7687;

/// WildFly Model Graph Analyzer - management model to Neo4j
#[derive(Parser)]
#[command(name = "mga")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// WildFly management interface as host[:port]
    #[arg(short, long, global = true, env = "MGA_WILDFLY", default_value = "localhost:9990")]
    pub wildfly: HostAndPort,

    /// WildFly management user
    #[arg(short = 'u', long, global = true, env = "MGA_WILDFLY_USER", default_value = "admin")]
    pub wildfly_user: String,

    /// WildFly management password
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "MGA_WILDFLY_PASSWORD",
        default_value = "admin",
        hide_env_values = true
    )]
    pub wildfly_password: String,

    /// Neo4j bolt endpoint as host[:port]
    #[arg(short, long, global = true, env = "MGA_NEO4J", default_value = "localhost:7687")]
    pub neo4j: HostAndPort,

    /// Neo4j user
    #[arg(short = 's', long, global = true, env = "MGA_NEO4J_USER", default_value = "neo4j")]
    pub neo4j_user: String,

    /// Neo4j password
    #[arg(
        short = 't',
        long,
        global = true,
        env = "MGA_NEO4J_PASSWORD",
        default_value = "neo4j",
        hide_env_values = true
    )]
    pub neo4j_password: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write log output to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the management model and store it in Neo4j
    Analyze(analyze::AnalyzeArgs),

    /// Show what is stored in Neo4j
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let wildfly = self.wildfly_config();
        let neo4j = self.graph_config();
        match self.command {
            Commands::Analyze(args) => analyze::execute(args, &wildfly, &neo4j).await,
            Commands::Status => status::execute(&neo4j).await,
        }
    }

    fn wildfly_config(&self) -> WildFlyConfig {
        WildFlyConfig {
            host: self.wildfly.clone(),
            user: self.wildfly_user.clone(),
            password: self.wildfly_password.clone(),
            ..WildFlyConfig::default()
        }
    }

    fn graph_config(&self) -> GraphConfig {
        let host = self.neo4j.clone().with_default_port(NEO4J_PORT);
        GraphConfig {
            uri: format!("bolt://{host}"),
            user: self.neo4j_user.clone(),
            password: self.neo4j_password.clone(),
            ..GraphConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mga", "status"]).unwrap();
        assert_eq!(cli.wildfly_config().host.to_string(), "localhost:9990");
        assert_eq!(cli.graph_config().uri, "bolt://localhost:7687");
        assert_eq!(cli.graph_config().database, "neo4j");
    }

    #[test]
    fn test_missing_ports_are_filled_in() {
        let cli = Cli::try_parse_from(["mga", "-w", "wildfly.local", "-n", "[::1]", "status"]).unwrap();
        assert_eq!(cli.wildfly_config().endpoint(), "http://wildfly.local:9990/management");
        assert_eq!(cli.graph_config().uri, "bolt://[::1]:7687");
    }

    #[test]
    fn test_analyze_args() {
        let cli = Cli::try_parse_from(["mga", "analyze", "/subsystem=logging", "--append"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.resource, "/subsystem=logging");
                assert!(args.append);
                assert!(!args.clean);
            }
            Commands::Status => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_append_conflicts_with_clean() {
        assert!(Cli::try_parse_from(["mga", "analyze", "--append", "--clean"]).is_err());
        assert!(Cli::try_parse_from(["mga", "-w", "host:99999", "status"]).is_err());
    }
}
