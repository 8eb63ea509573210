mod health;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    chatrelay_auto_reply::{RelayDispatcher, RelaySettings, RelayState},
    chatrelay_config::{RelayConfig, Severity},
    chatrelay_discord::{DiscordOutbound, build_client},
    chatrelay_providers::{CompletionProvider, openai::OpenAiCompatProvider},
};

#[derive(Parser)]
#[command(name = "chatrelay", about = "Discord chat relay for OpenAI-compatible models")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (skips discovery in ./ and ~/.config/chatrelay/).
    #[arg(long, global = true, env = "CHATRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Liveness server bind address (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Liveness server port (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and relay messages (default when no subcommand is provided).
    Run,
    /// Validate the configuration and exit.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = chatrelay_config::discover_and_load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

fn check(config: &RelayConfig) -> anyhow::Result<()> {
    let result = chatrelay_config::validate(config);
    if result.diagnostics.is_empty() {
        println!("configuration ok");
        return Ok(());
    }
    for d in &result.diagnostics {
        match d.env {
            Some(env) => println!("[{}] {}: {} (env {env})", d.severity, d.path, d.message),
            None => println!("[{}] {}: {}", d.severity, d.path, d.message),
        }
    }
    result.into_result()?;
    Ok(())
}

async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let validation = chatrelay_config::validate(&config);
    for d in validation.warnings() {
        warn!(path = d.path, "{}", d.message);
    }
    for d in validation
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
    {
        error!(path = d.path, env = ?d.env, "{}", d.message);
    }
    validation.into_result().context("invalid configuration")?;

    let provider = OpenAiCompatProvider::from_config(&config.completion)?;
    info!(
        provider = provider.name(),
        model = provider.id(),
        max_exchanges = config.history.max_exchanges,
        "completion provider ready"
    );

    let outbound = Arc::new(DiscordOutbound::new());
    let dispatcher = Arc::new(RelayDispatcher::new(
        RelaySettings::from_config(&config),
        RelayState::new(config.history.max_exchanges),
        Arc::new(provider),
        outbound.clone(),
    ));

    let shutdown = CancellationToken::new();
    let liveness = tokio::spawn(health::serve(config.server.clone(), shutdown.clone()));

    let mut client = build_client(&config.discord, dispatcher, outbound).await?;
    let shard_manager = client.shard_manager.clone();

    let result = tokio::select! {
        res = client.start() => res.context("discord client stopped"),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            shard_manager.shutdown_all().await;
            Ok(())
        },
    };

    shutdown.cancel();
    match liveness.await {
        Ok(Err(e)) => warn!(error = %e, "liveness server failed"),
        Err(e) => warn!(error = %e, "liveness task panicked"),
        Ok(Ok(())) => {},
    }
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "chatrelay starting");

    let config = load(&cli)?;
    match cli.command {
        None | Some(Commands::Run) => run(config).await,
        Some(Commands::Check) => check(&config),
    }
}
