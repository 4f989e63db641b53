//! Command execution.

use crate::Commands;
use colored::Colorize;
use dashio_client::Connection;
use dashio_protocol::{encoder, ControlType, ParsedMessage};
use serde_json::Value;
use std::time::Duration;

/// Executes a request command and returns the formatted output.
pub async fn execute(
    conn: &Connection,
    cmd: Commands,
    wait: Duration,
) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Listen { .. } | Commands::Topic { .. } => unreachable!(),

        Commands::Who => {
            conn.who().await?;
            let devices: Vec<_> = conn
                .collect(wait)
                .await?
                .into_iter()
                .filter(|m| m.control_type == ControlType::Who)
                .collect();

            if devices.is_empty() {
                return Ok("No devices found".yellow().to_string());
            }
            Ok(devices
                .iter()
                .map(format_device)
                .collect::<Vec<_>>()
                .join("\n"))
        }

        Commands::Connect { device } => {
            conn.connect_device(&device).await?;
            let accepted = conn
                .collect(wait)
                .await?
                .iter()
                .any(|m| m.device_id == device && m.control_type == ControlType::Connect);

            if accepted {
                Ok(format!("{} to {}", "Connected".green(), device.cyan()))
            } else {
                Err(format!("no reply from device {}", device).into())
            }
        }

        Commands::Config { device } => {
            conn.request_config(&device).await?;
            let lines: Vec<_> = replies_from(conn.collect(wait).await?, &device)
                .filter(|m| m.control_type == ControlType::Config)
                .map(|m| format_config(&m))
                .collect();

            if lines.is_empty() {
                return Ok("No configuration received".yellow().to_string());
            }
            Ok(lines.join("\n"))
        }

        Commands::Status { device } => {
            conn.request_status(&device).await?;
            let lines: Vec<_> = replies_from(conn.collect(wait).await?, &device)
                .map(|m| format_message(&m))
                .collect();

            if lines.is_empty() {
                return Ok("No control values".yellow().to_string());
            }
            Ok(lines.join("\n"))
        }

        Commands::Send {
            device,
            control,
            id,
            payload,
        } => {
            let control_type = parse_control(&control)?;
            let line = encoder::control_request(&device, control_type, &id, &payload)?;
            conn.send(&line).await?;

            let replies: Vec<_> = replies_from(conn.collect(wait).await?, &device)
                .map(|m| format_message(&m))
                .collect();

            let mut output = format!("{} {} {}", "Sent".green(), control_type, id.cyan());
            for reply in replies {
                output.push('\n');
                output.push_str(&reply);
            }
            Ok(output)
        }
    }
}

fn replies_from(
    messages: Vec<ParsedMessage>,
    device: &str,
) -> impl Iterator<Item = ParsedMessage> + '_ {
    messages.into_iter().filter(move |m| m.device_id == device)
}

/// Parses a control token typed on the command line.
pub fn parse_control(token: &str) -> Result<ControlType, String> {
    let control_type = ControlType::from_token(&token.to_ascii_uppercase());
    if control_type.has_wire_token() {
        Ok(control_type)
    } else {
        Err(format!("unknown control token '{}'", token))
    }
}

/// Formats a decoded device message on one line.
pub fn format_message(message: &ParsedMessage) -> String {
    let mut output = format!(
        "{} {}",
        message.device_id.cyan(),
        message.control_type.token().yellow()
    );
    for field in [&message.id, &message.payload1, &message.payload2] {
        if !field.is_empty() {
            output.push(' ');
            output.push_str(field);
        }
    }
    output
}

fn format_device(message: &ParsedMessage) -> String {
    format!(
        "{}  {}  {}",
        message.device_id.cyan().bold(),
        message.id,
        message.payload1.green()
    )
}

/// Formats one configuration reply, pretty-printing structured payloads.
pub fn format_config(message: &ParsedMessage) -> String {
    let header = format!("{} {}", message.device_id.cyan(), message.id.yellow());
    match serde_json::from_str::<Value>(&message.payload1) {
        Ok(value) if value.is_object() => {
            let body = serde_json::to_string_pretty(&value).unwrap_or_default();
            format!("{}\n{}", header, body)
        }
        _ => {
            let mut output = header;
            for field in [&message.payload1, &message.payload2] {
                if !field.is_empty() {
                    output.push(' ');
                    output.push_str(field);
                }
            }
            output
        }
    }
}
