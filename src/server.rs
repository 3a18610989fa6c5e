use crate::{args::Args, config, env_vars};
use std::env;
use tracing_subscriber::EnvFilter;
use xpgate_core::defaults::PROXY_ROUTE;
use xpgate_core::endpoint::Endpoint;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the level chosen with `-v`/`-q`.
pub fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));

    if args.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Print startup banner with configuration
pub fn print_startup_info(args: &Args) {
    if args.quiet {
        // Quiet mode: only essential information
        println!("🚀 xpgate v{} starting on port {}", env!("CARGO_PKG_VERSION"), args.listen);
        return;
    }

    println!("🛡️  {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("   {}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("📡 Network Configuration:");
    println!("   Listen:         {}:{}", args.bind, args.listen);
    println!("   Route:          GET {PROXY_ROUTE}");
    let endpoints: Vec<_> = Endpoint::ALL.iter().map(|e| e.as_str()).collect();
    println!("   Endpoints:      {}", endpoints.join(", "));
    match config::get_max_connections() {
        0 => println!("   Connections:    unlimited"),
        max => println!("   Connections:    {max} max"),
    }
    println!();

    let rate_config = config::get_rate_limit_config();
    println!("⚡ Rate Limiting:");
    println!(
        "   Max Requests:   {} per {} seconds",
        rate_config.max_requests,
        rate_config.window_duration.as_secs()
    );

    let upstream = config::get_upstream_config();
    println!("🔧 Upstream Configuration:");
    println!("   Base URL:       {}", upstream.base_url);
    println!("   Origin:         {}", upstream.origin);
    println!("   Timeout:        {}", upstream.timeout_display());

    if args.verbose {
        print_env_config();
    }

    println!();
    println!("🚀 Server starting...");
}

/// Print environment variable configuration status (used in verbose mode)
fn print_env_config() {
    println!();
    println!("🔧 Environment Variables:");

    for &var_name in env_vars::all_env_vars() {
        match env::var(var_name) {
            Ok(value) => println!("   {:<25} = {}", var_name, value),
            Err(_) => println!("   {:<25} = [NOT SET]", var_name),
        }
    }
}
