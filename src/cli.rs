use clap::{Parser, Subcommand};

/// gitdigest — API-key gated GitHub README summarization service
#[derive(Parser)]
#[command(name = "gitdigest", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Manage issued API keys
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Mint a new API key
    Create {
        #[arg(long)]
        name: String,
        /// Usage allowance recorded on the key
        #[arg(long, default_value = "1000")]
        limit: i32,
    },
    /// List issued keys
    List,
    /// Delete a key
    Delete {
        #[arg(long)]
        id: String,
    },
}
