use clap::{Parser, Subcommand};

/// Employee Records API: token-guarded employee CRUD and analytics
#[derive(Parser)]
#[command(name = "employee-api", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve {
        /// Port to bind; overrides EMPLOYEES_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the collection table and its indexes, then exit
    EnsureSchema,

    /// Mint an access token signed with the configured secret
    Token {
        #[arg(long)]
        subject: String,
        /// Lifetime in minutes; defaults to EMPLOYEES_TOKEN_TTL_MINUTES
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}
