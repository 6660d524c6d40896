mod input;
mod render;
mod shell;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use duet::RoomId;
use duet::client::config::{DEFAULT_SERVER_URL, SERVER_URL_ENV};
use duet::client::create_room;
use duet::server::{ADDR_ENV, DEFAULT_HISTORY_LIMIT, HISTORY_LIMIT_ENV, ServerConfig, serve};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet")]
#[command(about = "Two-person rooms with chat and a peer-to-peer call")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(long, env = ADDR_ENV, default_value = "0.0.0.0:5000")]
        addr: SocketAddr,

        #[arg(long, env = HISTORY_LIMIT_ENV, default_value_t = DEFAULT_HISTORY_LIMIT)]
        history_limit: usize,
    },
    /// Print a fresh room id to share.
    Create,
    /// Join a room and chat from the terminal.
    Join {
        room: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long, env = SERVER_URL_ENV, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            addr,
            history_limit,
        } => {
            println!("{} {}", "Relay listening on".green().bold(), addr);
            let config = ServerConfig::default()
                .with_addr(addr)
                .with_history_limit(history_limit);
            serve(config).await?;
        }
        Commands::Create => {
            let room_id = create_room();
            println!("{}", room_id.to_string().bold());
            println!("   Share it, then run: duet join {room_id}");
        }
        Commands::Join { room, name, server } => {
            let room_id = RoomId::parse(&room).context("Invalid room id")?;
            let name = match name.filter(|n| !n.trim().is_empty()) {
                Some(name) => name,
                None => prompt_name()?,
            };
            shell::run(&server, room_id, name).await?;
        }
    }

    Ok(())
}

fn prompt_name() -> Result<String> {
    let name: String = Input::new()
        .with_prompt("Your name")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read name")?;
    Ok(name.trim().to_owned())
}
