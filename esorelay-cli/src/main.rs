use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use esorelay_bot::{BotWorker, Notifier, TelegramApi, notify_channel};
use esorelay_events::EventHandler;
use esorelay_server::{AppState, CommandQueue, Server, shutdown_channel};
use esorelay_storage::{Config, EventLog, executable_dir};

const DEFAULT_PORT: &str = "9673";

#[derive(Debug, Parser)]
#[command(name = "esorelay")]
struct Cli {
    /// Config file name, resolved next to the executable.
    #[arg(long = "config", default_value = "config.txt")]
    config: String,
    #[arg(long = "listen-host", default_value = "0.0.0.0")]
    listen_host: String,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let base_dir = executable_dir().map_err(|err| err.to_string())?;

    let mut config = Config::load(&base_dir.join(&cli.config));
    if config.get("port").is_none() {
        config.set("port", DEFAULT_PORT);
    }
    let port: u16 = config
        .get("port")
        .unwrap_or(DEFAULT_PORT)
        .parse()
        .map_err(|_| format!("invalid port value {:?}", config.get("port")))?;
    let log_dir = config
        .get("logs")
        .map(PathBuf::from)
        .unwrap_or_else(|| base_dir.join("logs"));
    let token = config.get("token").map(str::to_string);
    let config = Arc::new(Mutex::new(config));

    let queue = Arc::new(CommandQueue::new());
    let event_log = EventLog::create(&log_dir).map_err(|err| err.to_string())?;
    let mut handlers: Vec<Box<dyn EventHandler>> = vec![Box::new(event_log)];

    let (stop_tx, stop_rx) = shutdown_channel();

    let bot_task = match token {
        Some(token) => {
            let (notify_tx, notify_rx) = notify_channel();
            handlers.push(Box::new(Notifier::new(notify_tx)));
            let worker = BotWorker::new(
                TelegramApi::new(&token),
                Arc::clone(&queue),
                Arc::clone(&config),
                notify_rx,
            );
            Some(tokio::spawn(worker.run(stop_tx.subscribe())))
        }
        None => {
            info!("no bot token configured, running without the bot");
            None
        }
    };

    let state = Arc::new(AppState { queue, handlers });
    let server = Server::bind(state, &cli.listen_host, port).map_err(|err| err.to_string())?;
    let server_task = tokio::spawn(server.run(stop_rx));

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| err.to_string())?;
    info!("shutting down");
    let _ = stop_tx.send(true);

    if let Some(bot_task) = bot_task {
        match bot_task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(%err, "bot worker failed"),
            Err(err) => error!(%err, "bot task panicked"),
        }
    }
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(%err, "server failed"),
        Err(err) => error!(%err, "server task panicked"),
    }

    Ok(())
}
