//! dashio-cli - Command-line dashboard for DashIO devices
//!
//! Sends dashboard requests to a device host over TCP and prints the
//! device's replies.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dashio_client::{Connection, ConnectionConfig};
use dashio_protocol::TopicKind;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashio-cli")]
#[command(about = "Command-line dashboard for DashIO devices")]
#[command(version)]
pub struct Cli {
    /// Device host address
    #[arg(short, long, default_value = "127.0.0.1:5650", env = "DASHIO_SERVER")]
    server: SocketAddr,

    /// How long to wait for further replies, in milliseconds
    #[arg(short, long, default_value = "500")]
    wait: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover devices on the host
    Who,

    /// Connect to a device
    Connect {
        /// Device ID
        device: String,
    },

    /// Print a device's configuration
    Config {
        /// Device ID
        device: String,
    },

    /// Print the current value of every control
    Status {
        /// Device ID
        device: String,
    },

    /// Print device messages until interrupted
    Listen {
        /// Only show messages from this device
        device: Option<String>,
    },

    /// Send a control message to a device
    Send {
        /// Device ID
        device: String,

        /// Control token, e.g. SLDR or BTTN
        control: String,

        /// Control ID
        id: String,

        /// Payload fields
        payload: Vec<String>,
    },

    /// Print the publish/subscribe topic for a device
    Topic {
        /// Account user name
        user: String,

        /// Device ID
        device: String,

        /// Topic purpose
        #[arg(value_enum)]
        kind: TopicArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TopicArg {
    Data,
    Control,
    Alarm,
    Announce,
    Will,
}

impl From<TopicArg> for TopicKind {
    fn from(arg: TopicArg) -> Self {
        match arg {
            TopicArg::Data => TopicKind::Data,
            TopicArg::Control => TopicKind::Control,
            TopicArg::Alarm => TopicKind::Alarm,
            TopicArg::Announce => TopicKind::Announce,
            TopicArg::Will => TopicKind::Will,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Topics are computed locally
    if let Commands::Topic { user, device, kind } = &cli.command {
        println!(
            "{}",
            dashio_protocol::topic::topic(user, device, (*kind).into())
        );
        return Ok(());
    }

    let wait = Duration::from_millis(cli.wait);
    tracing::debug!("Connecting to {}", cli.server);
    let conn = Connection::new(ConnectionConfig::new(cli.server));
    conn.connect().await.map_err(|e| {
        eprintln!("{}: {}", "Connection failed".red(), e);
        e
    })?;

    match cli.command {
        Commands::Listen { device } => {
            eprintln!(
                "{} {}",
                "Listening on".green(),
                cli.server.to_string().cyan()
            );
            eprintln!("{}", "Press Ctrl+C to stop...".dimmed());

            loop {
                tokio::select! {
                    result = conn.next_message_within(Duration::from_secs(3600)) => {
                        match result {
                            Ok(message) => {
                                if device.as_deref().map_or(true, |d| d == message.device_id) {
                                    println!("{}", commands::format_message(&message));
                                }
                            }
                            Err(dashio_client::ClientError::Timeout) => continue,
                            Err(e) => {
                                eprintln!("{}: {}", "Connection closed".red(), e);
                                break;
                            }
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        eprintln!("\n{}", "Stopping...".dimmed());
                        break;
                    }
                }
            }
        }
        cmd => match commands::execute(&conn, cmd, wait).await {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                conn.close().await;
                std::process::exit(1);
            }
        },
    }

    conn.close().await;
    Ok(())
}
