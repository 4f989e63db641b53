//! Control type registry.
//!
//! Every message carries a control type token in its second field. The
//! mapping between tokens and [`ControlType`] lives in a single static table
//! used in both directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    // Core protocol
    Connect,
    Who,
    Status,
    Config,

    // Dashboard controls
    Device,
    DeviceView,
    Label,
    Button,
    Menu,
    ButtonGroup,
    EventLog,
    Slider,
    Bar,
    Knob,
    KnobDial,
    Dial,
    Direction,
    TextBox,
    Selector,
    Graph,
    TimeGraph,
    Map,

    // Device setup
    DeviceName,
    WifiSetup,
    TcpSetup,
    DashioSetup,
    MqttSetup,
    PopupMessage,

    // Connection descriptions
    MqttConnection,
    BleConnection,
    TcpConnection,

    Alarm,

    // Never sent on the wire
    PushToken,
    Unknown,
}

/// Token table. Where two kinds share a token, the first entry wins when
/// decoding, so the device-bound setup kinds are listed before the
/// connection descriptions.
const REGISTRY: &[(ControlType, &str)] = &[
    (ControlType::Connect, "CONNECT"),
    (ControlType::Who, "WHO"),
    (ControlType::Status, "STATUS"),
    (ControlType::Config, "CFG"),
    (ControlType::Device, "DVCE"),
    (ControlType::DeviceView, "DVVW"),
    (ControlType::Label, "LBL"),
    (ControlType::Button, "BTTN"),
    (ControlType::Menu, "MENU"),
    (ControlType::ButtonGroup, "BTGP"),
    (ControlType::EventLog, "LOG"),
    (ControlType::Slider, "SLDR"),
    (ControlType::Bar, "BAR"),
    (ControlType::Knob, "KNOB"),
    (ControlType::KnobDial, "KBDL"),
    (ControlType::Dial, "DIAL"),
    (ControlType::Direction, "DIR"),
    (ControlType::TextBox, "TEXT"),
    (ControlType::Selector, "SLCTR"),
    (ControlType::Graph, "GRPH"),
    (ControlType::TimeGraph, "TGRPH"),
    (ControlType::Map, "MAP"),
    (ControlType::DeviceName, "NAME"),
    (ControlType::WifiSetup, "WIFI"),
    (ControlType::TcpSetup, "TCP"),
    (ControlType::DashioSetup, "DASHIO"),
    (ControlType::MqttSetup, "MQTT"),
    (ControlType::PopupMessage, "MSSG"),
    (ControlType::MqttConnection, "MQTT"),
    (ControlType::BleConnection, "BLE"),
    (ControlType::TcpConnection, "TCP"),
    (ControlType::Alarm, "ALM"),
    (ControlType::PushToken, ""),
    (ControlType::Unknown, ""),
];

impl ControlType {
    /// All control types, in registry order.
    pub fn all() -> impl Iterator<Item = ControlType> {
        REGISTRY.iter().map(|(control, _)| *control)
    }

    /// Returns the wire token. Empty for [`ControlType::PushToken`] and
    /// [`ControlType::Unknown`].
    pub fn token(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(control, _)| *control == self)
            .map(|(_, token)| *token)
            .unwrap_or("")
    }

    /// Looks up a wire token. Anything not in the registry is `Unknown`.
    pub fn from_token(token: &str) -> ControlType {
        if token.is_empty() {
            return ControlType::Unknown;
        }
        REGISTRY
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(control, _)| *control)
            .unwrap_or(ControlType::Unknown)
    }

    /// Returns whether this kind can be written to the wire.
    pub fn has_wire_token(self) -> bool {
        !self.token().is_empty()
    }

    /// Returns whether a message of this kind may carry an empty field at
    /// `segment` (0 = device id, 1 = control token, 2 = id, 3/4 = payloads).
    ///
    /// Device id and control token are never empty. Other positions may
    /// only be empty where a builder can legitimately produce an empty
    /// field, which for the who reply, device name and popup includes the
    /// id position.
    pub fn allows_empty_field(self, segment: usize) -> bool {
        match self {
            // Icon is kept positional when text follows it.
            ControlType::Button => segment == 4,
            ControlType::TextBox | ControlType::Dial => segment == 3,
            // Device type and name.
            ControlType::Who => segment == 2 || segment == 3,
            ControlType::DeviceName => segment == 2,
            // Header, body and caption.
            ControlType::PopupMessage => (2..=4).contains(&segment),
            ControlType::Map | ControlType::EventLog | ControlType::Alarm => {
                segment == 3 || segment == 4
            }
            ControlType::Selector | ControlType::Graph | ControlType::TimeGraph => segment == 4,
            _ => false,
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token() {
            "" => write!(f, "{:?}", self),
            token => f.write_str(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_total() {
        for control in ControlType::all() {
            match control {
                ControlType::PushToken | ControlType::Unknown => {
                    assert_eq!(control.token(), "");
                    assert!(!control.has_wire_token());
                }
                _ => {
                    assert!(!control.token().is_empty(), "{:?}", control);
                    assert!(control.has_wire_token());
                }
            }
        }
        assert_eq!(ControlType::all().count(), 34);
    }

    #[test]
    fn test_token_roundtrip() {
        for control in ControlType::all() {
            if !control.has_wire_token() {
                continue;
            }
            let decoded = ControlType::from_token(control.token());
            match control {
                ControlType::MqttConnection => assert_eq!(decoded, ControlType::MqttSetup),
                ControlType::TcpConnection => assert_eq!(decoded, ControlType::TcpSetup),
                _ => assert_eq!(decoded, control),
            }
        }
    }

    #[test]
    fn test_known_tokens() {
        assert_eq!(ControlType::from_token("WHO"), ControlType::Who);
        assert_eq!(ControlType::from_token("CFG"), ControlType::Config);
        assert_eq!(ControlType::from_token("BTTN"), ControlType::Button);
        assert_eq!(ControlType::from_token("TGRPH"), ControlType::TimeGraph);
        assert_eq!(ControlType::from_token("MSSG"), ControlType::PopupMessage);
        assert_eq!(ControlType::Alarm.token(), "ALM");
        assert_eq!(ControlType::KnobDial.token(), "KBDL");
    }

    #[test]
    fn test_unknown_tokens() {
        assert_eq!(ControlType::from_token(""), ControlType::Unknown);
        assert_eq!(ControlType::from_token("ZZZZ"), ControlType::Unknown);
        assert_eq!(ControlType::from_token("bttn"), ControlType::Unknown);
        assert_eq!(ControlType::from_token("BAS"), ControlType::Unknown);
    }

    #[test]
    fn test_empty_field_table() {
        let empty_id = [
            ControlType::Who,
            ControlType::DeviceName,
            ControlType::PopupMessage,
        ];
        for control in ControlType::all() {
            assert!(!control.allows_empty_field(0));
            assert!(!control.allows_empty_field(1));
            assert_eq!(
                control.allows_empty_field(2),
                empty_id.contains(&control),
                "{:?}",
                control
            );
        }
        assert!(ControlType::Who.allows_empty_field(3));
        assert!(ControlType::PopupMessage.allows_empty_field(4));
        assert!(ControlType::Button.allows_empty_field(4));
        assert!(!ControlType::Button.allows_empty_field(3));
        assert!(ControlType::TextBox.allows_empty_field(3));
        assert!(!ControlType::Slider.allows_empty_field(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(ControlType::Slider.to_string(), "SLDR");
        assert_eq!(ControlType::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&ControlType::ButtonGroup).unwrap();
        assert_eq!(yaml.trim(), "button_group");
        let parsed: ControlType = serde_yaml::from_str("time_graph").unwrap();
        assert_eq!(parsed, ControlType::TimeGraph);
    }
}
