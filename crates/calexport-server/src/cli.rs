//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calexport - Calendar export links and ICS downloads for records
#[derive(Debug, Parser)]
#[command(name = "calexport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALEXPORT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = "CALEXPORT_BIND")]
        bind: Option<SocketAddr>,

        /// JSON file holding the records
        #[arg(long)]
        records: Option<PathBuf>,
    },

    /// Write one record as an ICS file
    Export {
        /// Entity type of the record
        entity_type: String,

        /// Id of the record
        entity_id: String,

        /// Field holding the start date
        #[arg(long)]
        start: String,

        /// Field holding the end date
        #[arg(long)]
        end: String,

        /// Field holding the location
        #[arg(long)]
        location: Option<String>,

        /// Field holding the description
        #[arg(long)]
        description: Option<String>,

        /// Output file or directory (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the calendar links of one record as JSON
    Links {
        /// View whose link options apply
        view: String,

        /// Id of the record
        entity_id: String,
    },

    /// Validate the configuration against the records
    CheckConfig,
}
