use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod generator;
mod handler;
mod http;
mod logger;
mod server;

/// HTTP front-end for an external password generator
#[derive(Parser)]
#[command(name = "passgen-server")]
#[command(about = "Serves GET /v1/password by running an external password generator")]
#[command(version)]
struct Cli {
    /// Password generator executable [default: /usr/local/bin/password-generator]
    #[arg(long = "password-generator", value_name = "PATH")]
    password_generator: Option<String>,

    /// Port to listen on [default: 80]
    #[arg(long)]
    port: Option<u16>,

    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Print effective configuration (TOML) and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = config::Config::load_from(&cli.config)?;
    cfg.apply_cli_overrides(&config::CliOverrides {
        password_generator: cli.password_generator,
        port: cli.port,
    });
    cfg.validate()?;

    if cli.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {workers} worker threads");
    } else {
        println!("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let listener = server::create_listener(addr).map_err(|e| {
        logger::log_error(&format!("Failed to bind {addr}: {e}"));
        e
    })?;

    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(config::AppState::new(cfg));
    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
