mod config;
mod console;
mod server;

use std::sync::{Arc, PoisonError, RwLock};

use config::HostConfig;
use console::ConsoleLine;
use gmp_plugin::{GamemodePlus, PLUGIN_ID};
use gmp_plugin_api::{CommandSource, Plugin, ServerApi};
use server::SimulatedServer;
use tokio::io::AsyncBufReadExt;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

type SharedPlugin = Arc<RwLock<Box<dyn Plugin>>>;

#[tokio::main]
async fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "host.toml".to_string());
    let config = match HostConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let server = match SimulatedServer::from_config(&config, PLUGIN_ID) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Invalid player in {path}: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "gmp-host v{} (working directory: {}, {} players)",
        env!("CARGO_PKG_VERSION"),
        config.host.working_directory,
        config.players.len()
    );

    let mut boxed: Box<dyn Plugin> = Box::new(GamemodePlus::new());
    boxed.on_load(server.as_ref());
    let info = boxed.info();
    info!("Loaded {} v{} ({})", info.name, info.version, info.id);
    let plugin: SharedPlugin = Arc::new(RwLock::new(boxed));

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut jobs = JoinSet::new();
    loop {
        tokio::select! {
            line = console_rx.recv() => {
                let Some(line) = line else { break }; // stdin closed
                let Some(parsed) = console::parse_line(&line) else {
                    warn!("Unrecognised input. {}", console::USAGE);
                    continue;
                };
                match parsed {
                    ConsoleLine::Stop => break,
                    ConsoleLine::Reload => {
                        drain(&mut jobs).await;
                        reload(&plugin, &server);
                    }
                    other => handle_line(other, &plugin, &server, &mut jobs),
                }
            }
            Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                if let Err(e) = joined {
                    error!("Command worker failed: {e}");
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    drain(&mut jobs).await;
    info!("Saving plugin state before shutdown...");
    plugin
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .on_unload();
    info!("Host shut down.");
}

fn handle_line(
    line: ConsoleLine,
    plugin: &SharedPlugin,
    server: &Arc<SimulatedServer>,
    jobs: &mut JoinSet<()>,
) {
    match line {
        ConsoleLine::Player { name, command } => match server.source_for(&name) {
            Ok(source) => submit(source, command, plugin, server, jobs),
            Err(e) => warn!("{e}"),
        },
        ConsoleLine::Console(command) => {
            submit(CommandSource::Console, command, plugin, server, jobs)
        }
        ConsoleLine::Join(name) => {
            if !server.set_online(&name, true) {
                warn!("Unknown player {name}; add it to [[players]] first");
                return;
            }
            info!("{name} joined the game");
            let (plugin, server) = (plugin.clone(), server.clone());
            jobs.spawn_blocking(move || {
                plugin
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .on_player_joined(&name, server.as_ref());
            });
        }
        ConsoleLine::Quit(name) => {
            if server.set_online(&name, false) {
                info!("{name} left the game");
            } else {
                warn!("Unknown player {name}");
            }
        }
        ConsoleLine::List => {
            for (name, p) in server.list_players() {
                info!(
                    "{name} [{}] {} in {} at {} (level {})",
                    if p.online { "online" } else { "offline" },
                    p.gamemode,
                    p.dimension.display_name(),
                    p.position.block_string(),
                    p.permission
                );
            }
        }
        ConsoleLine::Help => {
            info!("{}", console::USAGE);
            for (prefix, description) in server.help_messages() {
                info!("  {prefix}: {description}");
            }
        }
        ConsoleLine::Reload | ConsoleLine::Stop => {}
    }
}

/// Route a command to the plugin if it owns the literal, otherwise to the
/// simulated server.
fn submit(
    source: CommandSource,
    command: String,
    plugin: &SharedPlugin,
    server: &Arc<SimulatedServer>,
    jobs: &mut JoinSet<()>,
) {
    if !server.is_routed(&command) {
        match source.player_name() {
            Some(name) => info!(target: "chat", "<{name}> {command}"),
            None => server.execute(&command),
        }
        return;
    }

    let (plugin, server) = (plugin.clone(), server.clone());
    jobs.spawn_blocking(move || {
        let replies = plugin
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .on_command(&source, &command, server.as_ref());
        for reply in replies.unwrap_or_default() {
            server.reply(&source, &reply);
        }
    });
}

fn reload(plugin: &SharedPlugin, server: &SimulatedServer) {
    let mut guard = plugin.write().unwrap_or_else(PoisonError::into_inner);
    guard.on_unload();
    server.clear_registrations();
    let mut fresh: Box<dyn Plugin> = Box::new(GamemodePlus::new());
    fresh.on_load(server);
    *guard = fresh;
    info!("Plugin reloaded");
}

async fn drain(jobs: &mut JoinSet<()>) {
    while let Some(joined) = jobs.join_next().await {
        if let Err(e) = joined {
            error!("Command worker failed: {e}");
        }
    }
}
