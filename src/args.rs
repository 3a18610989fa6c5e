//! Command line argument parsing for xpgate.
//!
//! This module defines the CLI interface using [`clap`] for argument parsing.
//! It provides configuration for the bind address, listen port, and output verbosity.
//! Upstream and rate limiting settings come from environment variables
//! (see [`crate::config`]).
//!
//! # Example
//!
//! ```no_run
//! use xpgate::args::Args;
//! use clap::Parser;
//!
//! let args = Args::parse();
//! if let Err(e) = args.validate() {
//!     eprintln!("Configuration error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

use clap::Parser;

/// Command line arguments for xpgate.
///
/// # Fields
///
/// * `bind` - Address to listen on (default: "0.0.0.0")
/// * `listen` - Port to listen on (default: 3000)
/// * `verbose` - Enable debug logs and detailed configuration output
/// * `quiet` - Only log warnings and errors (conflicts with verbose)
/// * `json_logs` - Output logs in JSON format for structured logging
#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(
    long_about = "Rate-limited pass-through proxy for the Incentiv leaderboard API\nServes GET /api/proxy?address=<wallet>&endpoint=xp|badges|mystery-box\n\nExample usage:\n  xpgate --listen 3000\n  xpgate -b 127.0.0.1 -l 8080 --verbose"
)]
#[command(
    after_help = "Environment variables:\n  RATE_LIMIT_REQUESTS    Requests allowed per client per window (default: 20)\n  RATE_LIMIT_WINDOW_SECS Rate limit window seconds (default: 60)\n  UPSTREAM_BASE_URL      Leaderboard API base URL\n  UPSTREAM_ORIGIN        Origin presented to the API\n  UPSTREAM_TIMEOUT_SECS  Upstream timeout, 0 for transport default (default: 0)\n  MAX_CONNECTIONS        Concurrent connection limit, 0 for unlimited (default: 10000)\n  RUST_LOG               Log filter (overrides -v/-q)"
)]
pub struct Args {
    /// Address to bind to
    #[arg(
        long,
        short = 'b',
        help = "Bind address for incoming connections",
        value_name = "ADDRESS",
        default_value = "0.0.0.0"
    )]
    pub bind: String,

    /// Port to listen on for incoming requests
    #[arg(
        long,
        short = 'l',
        help = "Listen port for incoming connections",
        value_name = "PORT",
        default_value_t = xpgate_core::defaults::LISTEN_PORT
    )]
    pub listen: u16,

    /// Enable verbose output
    #[arg(
        long,
        short = 'v',
        help = "Show detailed configuration and debug logs"
    )]
    pub verbose: bool,

    /// Enable quiet mode (minimal output)
    #[arg(
        long,
        short = 'q',
        help = "Suppress configuration output, log only warnings and errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output logs in JSON format (for structured logging)
    #[arg(long, help = "Output logs in JSON format for structured logging")]
    pub json_logs: bool,
}

impl Args {
    /// Validates the parsed command line arguments.
    ///
    /// Performs the following validations:
    /// - The listen port must be greater than 0
    /// - Bind address must be a valid IP address
    ///
    /// # Example
    ///
    /// ```
    /// use xpgate::args::Args;
    /// use clap::Parser;
    ///
    /// let args = Args::try_parse_from(["xpgate", "-l", "0"]).unwrap();
    /// assert!(args.validate().is_err());
    ///
    /// let args = Args::try_parse_from(["xpgate", "-l", "8080"]).unwrap();
    /// assert!(args.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.listen == 0 {
            return Err("Listen port must be greater than 0".to_string());
        }

        if self.bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address: '{}'", self.bind));
        }

        Ok(())
    }

    /// Default log filter directive for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
