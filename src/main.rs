#![cfg_attr(not(test), deny(clippy::panic))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use card_duel_server::config;
use card_duel_server::lobby_registry::LobbyRegistry;
use card_duel_server::logging;
use card_duel_server::metrics::ServerMetrics;
use card_duel_server::websocket;
use clap::Parser;

/// A two-player card duel server: lobby matching over WebSocket, six-round sessions.
#[derive(Parser, Debug)]
#[command(name = "card-duel-server")]
#[command(about = "A lightweight, in-memory WebSocket server for two-player card duels")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Preview timer: {}s", cfg.game.preview_secs);
                println!("  Sequence timer: {}s", cfg.game.sequence_secs);
                println!("  Swap timer: {}s", cfg.game.swap_secs);
                println!("  Continue timer: {}s", cfg.game.continue_secs);
                println!("  Reconnect window: {}s", cfg.game.reconnect_window_secs);
                println!(
                    "  Lobby sweep interval: {}s",
                    cfg.server.lobby_sweep_interval_secs
                );
                println!("  CORS origins: {}", cfg.server.cors_origins);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result.map_err(|e| anyhow::anyhow!(e))?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "starting card duel server");

    let timings: card_duel_server::session::SessionTimings = cfg.game.into();
    let metrics = Arc::new(ServerMetrics::new());
    let registry = Arc::new(LobbyRegistry::new(timings, metrics));

    let sweep_registry = registry.clone();
    let sweep_interval = Duration::from_secs(cfg.server.lobby_sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            sweep_registry.sweep_stale_lobbies().await;
        }
    });

    let app = websocket::create_router(&cfg.server.cors_origins).with_state(registry);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_flags() {
        let cli = Cli::try_parse_from(["card-duel-server"]).unwrap();
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_long() {
        let cli = Cli::try_parse_from(["card-duel-server", "--validate-config"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_short() {
        let cli = Cli::try_parse_from(["card-duel-server", "-c"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_print_config() {
        let cli = Cli::try_parse_from(["card-duel-server", "--print-config"]).unwrap();
        assert!(!cli.validate_config);
        assert!(cli.print_config);
    }

    #[test]
    fn test_cli_validate_and_print_config_conflict() {
        let result =
            Cli::try_parse_from(["card-duel-server", "--validate-config", "--print-config"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("cannot be used with"));
    }

    #[test]
    fn test_cli_version() {
        let result = Cli::try_parse_from(["card-duel-server", "--version"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_contains_flags() {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("--validate-config"));
        assert!(help.contains("--print-config"));
    }
}
