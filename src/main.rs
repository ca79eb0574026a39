//! Javaows
//!
//! Headless driver for the MDI desktop shell. Commands are read from stdin,
//! one per line, either as text (`launch calculator`, `tile`) or as tagged
//! JSON objects (`{"type":"Close","id":3}`).

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use javaows::shell::command::ShellCommand;
use javaows::shell::{self, Shell};
use javaows::Config;

/// Read command lines until stdin closes
async fn read_commands(tx: mpsc::UnboundedSender<ShellCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match ShellCommand::parse_line(&line) {
                    Ok(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring command '{}': {}", line.trim(), e),
                }
            }
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(e) => {
                error!("Failed to read command: {}", e);
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, command output to stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "javaows=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Javaows desktop shell");

    let config = Config::load().context("Failed to load configuration")?;

    let (ui_tx, mut ui_rx) = shell::ui_queue();
    let mut shell = Shell::new(&config, ui_tx);

    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_commands(command_tx));

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down"),
            }
            let _ = shutdown_tx.send(()).await;
        });
    }
    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, shutting down");
            }
            let _ = shutdown_tx.send(()).await;
        });
    }

    println!("{}", shell.status_line());

    loop {
        tokio::select! {
            Some(message) = ui_rx.recv() => shell.handle_ui_message(message),
            command = command_rx.recv() => {
                let Some(command) = command else {
                    break;
                };
                // Resolve menu selections before the quit check
                let command = match command.resolve() {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("{}", e);
                        continue;
                    }
                };
                if command == ShellCommand::Quit {
                    break;
                }

                let output = match shell.execute(command) {
                    Ok(output) => output,
                    Err(e) => {
                        error!("Desktop invariants broken: {:#}", e);
                        return Err(e);
                    }
                };
                if !output.is_empty() {
                    println!("{}", output);
                }
                for notice in shell.take_notices() {
                    warn!("{}", notice);
                    println!("! {}", notice);
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    info!("Javaows shutting down with {} open windows", shell.desktop().count());
    Ok(())
}
