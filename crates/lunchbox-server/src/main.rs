//! Lunchbox CLI
//!
//! Starts the menu extraction HTTP server.

use lunchbox_server::{build_state, config::ServerConfig, init_tracing, start_server};
use std::env;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        return Ok(());
    } else {
        eprintln!("Warning: No config file specified, using defaults");
        eprintln!("Usage: lunchbox --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default()
    };

    dotenvy::dotenv().ok();
    config.apply_env(|name| env::var(name).ok());
    config.validate()?;

    init_tracing();

    // Blocking HTTP clients must be created and dropped outside the runtime
    let state = build_state(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(start_server(&config, state.clone()))?;

    Ok(())
}

fn print_help() {
    println!("Lunchbox - Restaurant lunch menu extractor");
    println!();
    println!("USAGE:");
    println!("    lunchbox --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    lunchbox --config config/lunchbox.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address: IP address to bind (default: '127.0.0.1')");
    println!("    - bind_port: Port number (default: 5000)");
    println!("    - database_path: SQLite cache file (default: 'menu_cache.db')");
    println!("    - auth_token: Shared secret for the AUTH_TOKEN header (optional)");
    println!("    - [llm]: endpoint, model, api_key, timeout_secs");
    println!("    - [fetcher]: timeout_secs, max_chars, user_agent");
    println!("    - [extractor]: max_page_chars");
    println!();
    println!("ENVIRONMENT (also read from .env):");
    println!("    OPENAI_API_KEY     Overrides llm.api_key");
    println!("    AUTH_TOKEN         Overrides auth_token");
    println!("    MENU_CACHE_DB      Overrides database_path");
    println!("    RUST_LOG           Log filter (default: info)");
    println!();
}
