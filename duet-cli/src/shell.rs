use crate::input::{HELP, ShellInput, parse_line};
use crate::render::{Renderer, participants};
use anyhow::{Context, Result};
use colored::*;
use duet::RoomId;
use duet::client::{ClientBuilder, ClientConfig, ClientError, RoomHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Joins `room_id` and drives the room from stdin until `/leave` or EOF.
pub async fn run(server: &str, room_id: RoomId, name: String) -> Result<()> {
    let config = ClientConfig::from_env().with_server_url(server);
    let handle = ClientBuilder::new(config)
        .connect()
        .await
        .with_context(|| format!("Could not reach relay at {server}"))?;

    handle
        .join_room(room_id.clone(), name.clone())
        .await
        .context("Failed to join room")?;
    info!(room = %room_id, name = %name, "joined");

    println!(
        "{} {} {}",
        "Joined room".green().bold(),
        room_id.to_string().bold(),
        format!("as {name}. Type /help for commands.").dimmed()
    );

    let mut renderer = Renderer::new();
    let mut view_rx = handle.subscribe();
    renderer.render(&view_rx.borrow_and_update());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    warn!("room coordinator stopped");
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                renderer.render(&view);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !dispatch(&handle, parse_line(&line)).await {
                    break;
                }
            }
        }
    }

    handle.shutdown().await.ok();
    println!("{}", "Left the room.".dimmed());
    Ok(())
}

/// Runs one input against the room. Returns false when the shell should exit.
async fn dispatch(handle: &RoomHandle, input: ShellInput) -> bool {
    let result = match input {
        ShellInput::Empty => Ok(()),
        ShellInput::Chat(body) => handle.send_message(body).await.map(|_| ()),
        ShellInput::Call => {
            // Capture may wait on the user; keep reading input meanwhile.
            let handle = handle.clone();
            tokio::spawn(async move {
                if let Err(e) = handle.start_call().await {
                    report(&e);
                }
            });
            Ok(())
        }
        ShellInput::HangUp => handle.hang_up().await.map(|ended| {
            if !ended {
                notice("no call to end");
            }
        }),
        ShellInput::Mic => handle.toggle_mic().await.map(|state| match state {
            Some(on) => notice(&format!("microphone {}", on_off(on))),
            None => notice("no call in progress"),
        }),
        ShellInput::Cam => handle.toggle_cam().await.map(|state| match state {
            Some(on) => notice(&format!("camera {}", on_off(on))),
            None => notice("no call in progress"),
        }),
        ShellInput::Who => {
            notice(&participants(&handle.view()));
            Ok(())
        }
        ShellInput::Help => {
            println!("{}", HELP.dimmed());
            Ok(())
        }
        ShellInput::Unknown(command) => {
            notice(&format!("unknown command /{command}, try /help"));
            Ok(())
        }
        ShellInput::Leave => return false,
    };

    if let Err(e) = result {
        report(&e);
    }
    true
}

fn report(e: &ClientError) {
    eprintln!("{} {}", "error:".red().bold(), e);
}

fn notice(text: &str) {
    println!("{}", text.yellow());
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
