//! CLI module - Command-line interface for Stockyard
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Role;
use crate::services::ExportFormat;

/// Stockyard - Apparel inventory backend
#[derive(Parser)]
#[command(name = "stockyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web", alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a user account with any role
    CreateUser {
        /// Login email
        email: String,
        /// Account role
        #[arg(long, default_value = "viewer", value_parser = parse_role)]
        role: Role,
        /// Initial password
        #[arg(long)]
        password: String,
    },

    /// Import inventory rows from a CSV file
    Import {
        /// Path to the CSV file
        path: PathBuf,
        /// Recorded as the creator/modifier of touched items
        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Export inventory to a file
    Export {
        /// Output path
        path: PathBuf,
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Comma-separated field keys; all fields when omitted
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Print inventory summary statistics
    Stats,
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse().map_err(|e: crate::domain::UnknownVariant| e.to_string())
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_user() {
        let cli = Cli::try_parse_from([
            "stockyard",
            "create-user",
            "ops@example.com",
            "--role",
            "staff",
            "--password",
            "s3cretpass",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateUser { email, role, .. }) => {
                assert_eq!(email, "ops@example.com");
                assert_eq!(role, Role::Staff);
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn parses_export_fields_list() {
        let cli = Cli::try_parse_from([
            "stockyard",
            "export",
            "out.json",
            "--format",
            "json",
            "--fields",
            "sku,warehouse,quantity",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Export { format, fields, .. }) => {
                assert_eq!(format, ExportFormat::Json);
                assert_eq!(fields, ["sku", "warehouse", "quantity"]);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(
            Cli::try_parse_from([
                "stockyard",
                "create-user",
                "a@b.co",
                "--role",
                "owner",
                "--password",
                "x"
            ])
            .is_err()
        );
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["stockyard"]).unwrap();
        assert!(cli.command.is_none());
    }
}
