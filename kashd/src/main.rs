use kashd::{cli, ui, Config, Daemon};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = cli::parse_args();
    init_logging(&args);

    // Network defaults first, then the config file, then CLI overrides
    let loaded = match (&args.config_path, &args.network) {
        (Some(path), _) => Config::load(path),
        (None, Some(network)) => Config::for_network(network),
        (None, None) => Ok(Config::default()),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => exit_with_error(&format!("Invalid configuration: {}", e)),
    };
    config.apply_cli_overrides(&args);

    ui::print_banner(env!("CARGO_PKG_VERSION"), &config.network.network_id);
    ui::print_config_summary(&config);

    let daemon = match Daemon::new(config).await {
        Ok(d) => d,
        Err(e) => exit_with_error(&format!("Failed to initialize daemon: {}", e)),
    };

    if let Err(e) = daemon.run().await {
        exit_with_error(&format!("Daemon error: {}", e));
    }

    ui::print_status("✓", "kashd stopped gracefully", ui::StatusType::Success);
    info!("kashd stopped gracefully");
}

fn exit_with_error(message: &str) -> ! {
    ui::print_status("✗", message, ui::StatusType::Error);
    error!("{}", message);
    process::exit(1);
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt().with_env_filter(filter).with_target(true).with_thread_ids(true).init();
}
