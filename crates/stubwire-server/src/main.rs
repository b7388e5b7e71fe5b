//! `stubwire` binary

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use stubwire_core::InsertionOrder;
use stubwire_server::{logging, run, ServerConfig};

fn cli() -> Command {
    Command::new("stubwire")
        .version(stubwire_server::VERSION)
        .about("HTTP stub server with session-scoped scenario state")
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_parser(value_parser!(SocketAddr))
                .help("Listen address (default 127.0.0.1:8080)"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_parser(value_parser!(u16))
                .help("Listen port, keeping the configured host"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("no-session-aware")
                .long("no-session-aware")
                .action(ArgAction::SetTrue)
                .help("Share one scenario state across all clients"),
        )
        .arg(
            Arg::new("session-ttl")
                .long("session-ttl")
                .value_parser(value_parser!(u64))
                .help("Evict sessions idle for this many seconds"),
        )
        .arg(
            Arg::new("minted-ttl")
                .long("minted-ttl")
                .value_parser(value_parser!(u64))
                .help("Evict minted sessions no client presented again after this many seconds"),
        )
        .arg(
            Arg::new("oldest-first")
                .long("oldest-first")
                .action(ArgAction::SetTrue)
                .help("Break equal-priority ties in favour of the first registered stub"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("log-json"));

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = matches.get_one::<SocketAddr>("bind") {
        config.bind = *bind;
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config = config.with_port(*port);
    }
    if matches.get_flag("no-session-aware") {
        config.engine = config.engine.with_session_aware(false);
    }
    if let Some(ttl) = matches.get_one::<u64>("session-ttl") {
        config.engine = config.engine.with_idle_ttl(Duration::from_secs(*ttl));
    }
    if let Some(ttl) = matches.get_one::<u64>("minted-ttl") {
        config.engine = config.engine.with_minted_ttl(Duration::from_secs(*ttl));
    }
    if matches.get_flag("oldest-first") {
        config.engine.selection = config
            .engine
            .selection
            .with_insertion_order(InsertionOrder::OldestFirst);
    }

    run(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await?;
    Ok(())
}
