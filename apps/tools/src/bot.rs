use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use shared::{
    domain::{AssignedControl, ControlId, ControlKind, DeviceId},
    protocol::{ClientMessage, ServerEvent},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

pub fn ws_url(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/ws")
}

/// Reads back which of `controls` an instruction names and the value it asks for.
pub fn solve_instruction(controls: &[AssignedControl], instruction: &str) -> Option<(ControlId, i64)> {
    let control = controls
        .iter()
        .find(|control| instruction.contains(&format!("'{}'", control.label)))?;
    let (_, tail) = instruction.split_once(&format!("'{}'", control.label))?;

    let value = match control.kind {
        ControlKind::Toggle if tail.contains(" AN.") => control.max_value,
        ControlKind::Toggle => control.min_value,
        _ => last_number(tail)?,
    };
    Some((control.id.clone(), value))
}

fn last_number(text: &str) -> Option<i64> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|digits| !digits.is_empty())
        .last()?
        .parse()
        .ok()
}

/// Plays one panel until the server closes the connection, answering tasks addressed to it.
pub async fn run_bot(ws_url: &str, delay: Duration) -> Result<()> {
    let (ws, _) = connect_async(ws_url)
        .await
        .with_context(|| format!("failed to connect websocket: {ws_url}"))?;
    let (mut writer, mut reader) = ws.split();
    let mut identity: Option<(DeviceId, Vec<AssignedControl>)> = None;

    while let Some(frame) = reader.next().await {
        let Message::Text(text) = frame? else {
            continue;
        };
        let event = match ServerEvent::decode(&text) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, "skipping unreadable frame");
                continue;
            }
        };

        match event {
            ServerEvent::Init {
                device_id,
                controls,
            } => {
                let labels: Vec<&str> = controls.iter().map(|c| c.label.as_str()).collect();
                info!(%device_id, ?labels, "bot joined");
                identity = Some((device_id, controls));
            }
            ServerEvent::NewTask {
                instruction,
                target_device,
                ..
            } => {
                let Some((device_id, controls)) = &identity else {
                    continue;
                };
                if target_device != *device_id {
                    continue;
                }
                let Some((control_id, value)) = solve_instruction(controls, &instruction) else {
                    warn!(%device_id, %instruction, "could not read instruction");
                    continue;
                };
                tokio::time::sleep(delay).await;
                info!(%device_id, %control_id, value, "answering task");
                let frame = ClientMessage::ControlChange { control_id, value }.encode()?;
                writer.send(Message::Text(frame)).await?;
            }
            ServerEvent::Success { score, .. } => info!(score, "task solved"),
            ServerEvent::SessionState { active, score } => {
                info!(active, score, "session state changed")
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/bot_tests.rs"]
mod tests;
