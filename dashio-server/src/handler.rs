//! Message dispatch for one device.

use crate::config::DeviceConfig;
use crate::session::Session;
use dashio_protocol::{ControlType, Decoder, Encoder, ParsedMessage, UNKNOWN_DEVICE_ID};
use parking_lot::Mutex;
use std::sync::Arc;

/// Application hook for control messages the host does not answer itself.
///
/// Returned lines are written back to the dashboard that sent the message.
pub trait ControlCallback: Send + Sync {
    fn on_control(&self, message: &ParsedMessage, encoder: &Encoder) -> Vec<String>;
}

impl<F> ControlCallback for F
where
    F: Fn(&ParsedMessage, &Encoder) -> Vec<String> + Send + Sync,
{
    fn on_control(&self, message: &ParsedMessage, encoder: &Encoder) -> Vec<String> {
        self(message, encoder)
    }
}

/// Identifies the control a published line updates.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RetainKey {
    control_type: ControlType,
    id: String,
    /// Graph line id; graphs carry one retained line per graph line.
    line_id: String,
}

impl RetainKey {
    fn from_line(line: &str) -> Option<(String, RetainKey)> {
        let message = Decoder::new().feed_str(line).into_iter().next()?;
        if !message.control_type.has_wire_token() || message.id.is_empty() {
            return None;
        }
        let line_id = match message.control_type {
            ControlType::Graph | ControlType::TimeGraph => message.payload1,
            _ => String::new(),
        };
        Some((
            message.device_id,
            RetainKey {
                control_type: message.control_type,
                id: message.id,
                line_id,
            },
        ))
    }
}

/// Answers dashboard requests on behalf of one device.
pub struct DeviceHandler {
    encoder: Encoder,
    /// Device config followed by every control config.
    config_lines: Vec<String>,
    /// Last published line per control, in first-publish order.
    retained: Mutex<Vec<(RetainKey, String)>>,
    callback: Option<Arc<dyn ControlCallback>>,
}

impl DeviceHandler {
    pub fn new(device: &DeviceConfig) -> Self {
        let encoder = Encoder::new(&device.device_id, &device.device_type, &device.name);
        let mut config_lines = Vec::with_capacity(device.controls.len() + 1);
        config_lines.push(encoder.config(&device.device_cfg()));
        for control in &device.controls {
            config_lines.push(encoder.config(control.as_payload()));
        }

        Self {
            encoder,
            config_lines,
            retained: Mutex::new(Vec::new()),
            callback: None,
        }
    }

    /// Sets the application callback.
    pub fn with_callback(mut self, callback: Arc<dyn ControlCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Handles one decoded message and returns the reply lines.
    pub fn handle(&self, session: &Session, message: &ParsedMessage) -> Vec<String> {
        session.record_message();

        let addressed = message.device_id == self.encoder.device_id();

        if message.control_type == ControlType::Who
            && (addressed || message.device_id == UNKNOWN_DEVICE_ID)
        {
            return vec![self.encoder.who()];
        }

        if !addressed {
            tracing::trace!(
                "[{}] Ignoring message for device {}",
                session.remote_addr,
                message.device_id
            );
            session.record_dropped();
            return Vec::new();
        }

        match message.control_type {
            ControlType::Connect => {
                session.set_connected(true);
                vec![self.encoder.connect()]
            }
            ControlType::Config => self.config_lines.clone(),
            ControlType::Status => self.status_lines(),
            _ => {
                let Some(callback) = &self.callback else {
                    tracing::debug!(
                        "[{}] No handler for {} message",
                        session.remote_addr,
                        message.control_type
                    );
                    return Vec::new();
                };
                let replies = callback.on_control(message, &self.encoder);
                for line in &replies {
                    self.retain(line);
                }
                replies
            }
        }
    }

    /// Records a published line as the current value of its control.
    /// Lines for other devices, and lines that do not name a control, are
    /// not retained. Returns whether the line was retained.
    pub fn retain(&self, line: &str) -> bool {
        let Some((device_id, key)) = RetainKey::from_line(line) else {
            return false;
        };
        if device_id != self.encoder.device_id() {
            return false;
        }

        let mut retained = self.retained.lock();
        match retained.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = line.to_string(),
            None => retained.push((key, line.to_string())),
        }
        true
    }

    /// Current value of every control that has published one.
    pub fn status_lines(&self) -> Vec<String> {
        self.retained
            .lock()
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Configuration reply lines.
    pub fn config_lines(&self) -> &[String] {
        &self.config_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashio_protocol::config::{ButtonCfg, ControlConfig, ControlHeader, LineType};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    fn device() -> DeviceConfig {
        DeviceConfig {
            device_id: "DEV".to_string(),
            device_type: "Pump".to_string(),
            name: "Garden".to_string(),
            num_device_views: 1,
            device_setup: "name".to_string(),
            controls: vec![ControlConfig::Button(ButtonCfg {
                header: ControlHeader {
                    control_id: "B1".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })],
        }
    }

    fn session() -> Session {
        Session::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 40000))
    }

    fn message(input: &str) -> ParsedMessage {
        Decoder::new().feed_str(input).pop().unwrap()
    }

    #[test]
    fn test_who_broadcast_and_addressed() {
        let handler = DeviceHandler::new(&device());
        let session = session();

        let replies = handler.handle(&session, &message("\tWHO\n"));
        assert_eq!(replies, vec!["\tDEV\tWHO\tPump\tGarden\n".to_string()]);

        let replies = handler.handle(&session, &message("\tDEV\tWHO\n"));
        assert_eq!(replies.len(), 1);

        assert!(handler.handle(&session, &message("\tOTHER\tWHO\n")).is_empty());
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.dropped_count(), 1);
    }

    #[test]
    fn test_connect() {
        let handler = DeviceHandler::new(&device());
        let session = session();
        let replies = handler.handle(&session, &message("\tDEV\tCONNECT\n"));
        assert_eq!(replies, vec!["\tDEV\tCONNECT\n".to_string()]);
        assert!(session.is_connected());
    }

    #[test]
    fn test_config_reply() {
        let handler = DeviceHandler::new(&device());
        let replies = handler.handle(&session(), &message("\tDEV\tCFG\n"));
        assert_eq!(replies.len(), 2);
        assert_eq!(
            replies[0],
            "\tDEV\tCFG\tDVCE\t{\"numDeviceViews\":1,\"deviceSetup\":\"name\"}\n"
        );
        assert!(replies[1].starts_with("\tDEV\tCFG\tBTTN\t{\"controlID\":\"B1\""));
        assert_eq!(handler.config_lines(), replies.as_slice());
    }

    #[test]
    fn test_status_returns_retained_values() {
        let handler = DeviceHandler::new(&device());
        let encoder = handler.encoder().clone();

        assert!(handler.handle(&session(), &message("\tDEV\tSTATUS\n")).is_empty());

        assert!(handler.retain(&encoder.slider("S1", 10)));
        assert!(handler.retain(&encoder.button("B1", false, "", "")));
        assert!(handler.retain(&encoder.slider("S1", 20)));
        assert!(handler.retain(&encoder.graph_line_ints("G", "L1", "a", LineType::Line, "red", &[1])));
        assert!(handler.retain(&encoder.graph_line_ints("G", "L2", "b", LineType::Line, "red", &[2])));
        assert!(!handler.retain(&encoder.online()));
        assert!(!handler.retain(&Encoder::new("OTHER", "", "").slider("S1", 1)));

        let replies = handler.handle(&session(), &message("\tDEV\tSTATUS\n"));
        assert_eq!(replies.len(), 4);
        assert_eq!(replies[0], encoder.slider("S1", 20));
        assert_eq!(replies[1], encoder.button("B1", false, "", ""));
    }

    #[test]
    fn test_callback_replies_are_retained() {
        let callback = |message: &ParsedMessage, encoder: &Encoder| -> Vec<String> {
            match message.control_type {
                ControlType::Button => vec![encoder.button(&message.id, true, "", "")],
                _ => Vec::new(),
            }
        };
        let handler = DeviceHandler::new(&device()).with_callback(Arc::new(callback));

        let replies = handler.handle(&session(), &message("\tDEV\tBTTN\tB1\n"));
        assert_eq!(replies, vec!["\tDEV\tBTTN\tB1\tON\n".to_string()]);
        assert_eq!(handler.status_lines(), replies);

        assert!(handler.handle(&session(), &message("\tDEV\tKNOB\tK1\t3\n")).is_empty());
    }

    #[test]
    fn test_no_callback() {
        let handler = DeviceHandler::new(&device());
        assert!(handler
            .handle(&session(), &message("\tDEV\tSLDR\tS1\t5\n"))
            .is_empty());
    }
}
