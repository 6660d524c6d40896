use colored::*;
use duet::client::ViewState;
use duet::client::negotiation::NegotiationState;
use duet::client::projector::{ChatLine, LineOrigin};

/// Turns successive views into terminal output, printing only what changed.
#[derive(Default)]
pub struct Renderer {
    printed: Vec<ChatLine>,
    call_state: Option<NegotiationState>,
    remote_label: Option<String>,
    connected: Option<bool>,
    alert: Option<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &ViewState) {
        for line in self.update(view) {
            println!("{line}");
        }
    }

    pub fn update(&mut self, view: &ViewState) -> Vec<String> {
        let mut out = Vec::new();

        if self.connected != Some(view.connected) {
            if self.connected.is_some() || !view.connected {
                out.push(connection_line(view.connected));
            }
            self.connected = Some(view.connected);
        }

        // History replaced (room switch, rejoin snapshot): reprint it all.
        if !view.lines.starts_with(&self.printed) {
            out.push(format!("{}", "--- history ---".dimmed()));
            self.printed.clear();
        }
        for line in &view.lines[self.printed.len()..] {
            out.push(chat_line(line));
        }
        self.printed = view.lines.clone();

        if self.call_state != Some(view.call.state) {
            if self.call_state.is_some() || view.call.state != NegotiationState::Idle {
                out.push(format!(
                    "{} {}",
                    "call:".magenta().bold(),
                    view.call.state.as_str()
                ));
            }
            self.call_state = Some(view.call.state);
        }

        if self.remote_label.as_deref() != Some(view.call.remote_label.as_str()) {
            if view.call.remote_media {
                out.push(format!(
                    "{} {}",
                    "remote media from".magenta(),
                    view.call.remote_label
                ));
            }
            self.remote_label = Some(view.call.remote_label.clone());
        }

        if self.alert != view.alert {
            if let Some(alert) = &view.alert {
                out.push(format!("{} {}", "!".red().bold(), alert.red()));
            }
            self.alert = view.alert.clone();
        }

        out
    }
}

fn connection_line(connected: bool) -> String {
    if connected {
        format!("{}", "reconnected to relay".green())
    } else {
        format!("{}", "connection to relay lost, retrying".yellow())
    }
}

fn chat_line(line: &ChatLine) -> String {
    let stamp = format!("[{}]", line.sent_at).dimmed();
    match line.origin {
        LineOrigin::System => format!("{} {}", stamp, line.body.dimmed().italic()),
        LineOrigin::Own => format!("{} {}: {}", stamp, line.author.green().bold(), line.body),
        LineOrigin::Remote => format!("{} {}: {}", stamp, line.author.cyan().bold(), line.body),
    }
}

pub fn participants(view: &ViewState) -> String {
    if view.participants.is_empty() {
        return "nobody here yet".to_owned();
    }
    view.participants
        .iter()
        .map(|p| {
            if p.is_self {
                format!("{} (you)", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
