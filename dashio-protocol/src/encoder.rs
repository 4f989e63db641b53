//! Message builders.
//!
//! Every outgoing line has the shape
//!
//! ```text
//! \t<device_id>\t<TOKEN>[\t<field>...]\n
//! ```
//!
//! [`Encoder`] carries the device identity and builds device-side messages.
//! The free functions at the bottom build dashboard-side requests, which
//! need no identity of their own.

use crate::config::{ConfigPayload, LineType};
use crate::control::ControlType;
use crate::error::ProtocolError;
use crate::payload::format_float;
use crate::topic::{self, TopicKind};
use crate::{FIELD_SEPARATOR, TERMINATOR};
use std::fmt::{Display, Write};

const ONLINE: &str = "ONLINE";
const OFFLINE: &str = "OFFLINE";
const BUTTON_ON: &str = "ON";
const BUTTON_OFF: &str = "OFF";
const BASIC_CONFIG: &str = "BAS";
const BREAK_MARKER: &str = "B";

/// Incremental line writer.
struct Line {
    buf: String,
}

impl Line {
    fn start(device_id: &str) -> Self {
        let mut buf = String::with_capacity(64);
        buf.push(FIELD_SEPARATOR);
        buf.push_str(device_id);
        Self { buf }
    }

    fn field(mut self, value: impl Display) -> Self {
        self.buf.push(FIELD_SEPARATOR);
        let _ = write!(self.buf, "{}", value);
        self
    }

    fn fields<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        for value in values {
            self = self.field(value);
        }
        self
    }

    fn finish(mut self) -> String {
        self.buf.push(TERMINATOR);
        self.buf
    }
}

fn wire_token(control_type: ControlType) -> Result<&'static str, ProtocolError> {
    if control_type.has_wire_token() {
        Ok(control_type.token())
    } else {
        Err(ProtocolError::NoWireToken(control_type))
    }
}

/// Builds device-side messages for one device identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoder {
    device_id: String,
    device_type: String,
    name: String,
}

impl Encoder {
    pub fn new(
        device_id: impl Into<String>,
        device_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            device_type: device_type.into(),
            name: name.into(),
        }
    }

    /// Uses a hardware address as the device id: twelve lowercase hex
    /// digits, each octet zero-padded.
    pub fn with_mac_address(
        mac: [u8; 6],
        device_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let device_id = mac.iter().fold(String::with_capacity(12), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        });
        Self::new(device_id, device_type, name)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Publish/subscribe topic for this device.
    pub fn topic(&self, user: &str, kind: TopicKind) -> String {
        topic::topic(user, &self.device_id, kind)
    }

    fn line(&self, control_type: ControlType) -> Line {
        Line::start(&self.device_id).field(control_type.token())
    }

    // ---------------------------------------------------------------------
    // Lifecycle and identity
    // ---------------------------------------------------------------------

    /// `\t<dev>\tONLINE\n`
    pub fn online(&self) -> String {
        Line::start(&self.device_id).field(ONLINE).finish()
    }

    /// `\t<dev>\tOFFLINE\n`
    pub fn offline(&self) -> String {
        Line::start(&self.device_id).field(OFFLINE).finish()
    }

    /// `\t<dev>\tWHO\t<type>\t<name>\n`
    pub fn who(&self) -> String {
        self.line(ControlType::Who)
            .field(&self.device_type)
            .field(&self.name)
            .finish()
    }

    /// `\t<dev>\tCONNECT\n`
    pub fn connect(&self) -> String {
        self.line(ControlType::Connect).finish()
    }

    /// `\t<dev>\tNAME\t<name>\n`
    pub fn device_name(&self) -> String {
        self.line(ControlType::DeviceName).field(&self.name).finish()
    }

    /// `\t<dev>\tMSSG\t<header>[\t<body>[\t<caption>]]\n`
    ///
    /// The body is written only when non-empty, and the caption only when
    /// the body was written.
    pub fn popup(&self, header: &str, body: &str, caption: &str) -> String {
        let mut line = self.line(ControlType::PopupMessage).field(header);
        if !body.is_empty() {
            line = line.field(body);
            if !caption.is_empty() {
                line = line.field(caption);
            }
        }
        line.finish()
    }

    pub fn wifi_update_ack(&self) -> String {
        self.line(ControlType::WifiSetup).finish()
    }

    pub fn tcp_update_ack(&self) -> String {
        self.line(ControlType::TcpSetup).finish()
    }

    pub fn dashio_update_ack(&self) -> String {
        self.line(ControlType::DashioSetup).finish()
    }

    pub fn mqtt_update_ack(&self) -> String {
        self.line(ControlType::MqttSetup).finish()
    }

    /// `\t<dev>\tALM\t<id>\t<title>\t<description>\n`
    pub fn alarm(&self, id: &str, title: &str, description: &str) -> String {
        self.line(ControlType::Alarm)
            .field(id)
            .field(title)
            .field(description)
            .finish()
    }

    // ---------------------------------------------------------------------
    // Control updates
    // ---------------------------------------------------------------------

    /// `\t<dev>\tBTTN\t<id>\t<ON|OFF>[\t<icon>][\t<text>]\n`
    ///
    /// With text, the icon is always written (possibly empty) so the text
    /// stays in its position. Without text, the icon is written only when
    /// non-empty.
    pub fn button(&self, id: &str, on: bool, icon: &str, text: &str) -> String {
        let state = if on { BUTTON_ON } else { BUTTON_OFF };
        let mut line = self.line(ControlType::Button).field(id).field(state);
        if !text.is_empty() {
            line = line.field(icon).field(text);
        } else if !icon.is_empty() {
            line = line.field(icon);
        }
        line.finish()
    }

    pub fn text_box(&self, id: &str, text: &str) -> String {
        self.line(ControlType::TextBox).field(id).field(text).finish()
    }

    pub fn selector(&self, id: &str, index: i32) -> String {
        self.line(ControlType::Selector)
            .field(id)
            .field(index)
            .finish()
    }

    /// Selector update that also replaces the selectable items.
    pub fn selector_with_items<S: AsRef<str>>(&self, id: &str, index: i32, items: &[S]) -> String {
        self.line(ControlType::Selector)
            .field(id)
            .field(index)
            .fields(items.iter().map(|s| s.as_ref()))
            .finish()
    }

    pub fn slider(&self, id: &str, value: i32) -> String {
        self.line(ControlType::Slider).field(id).field(value).finish()
    }

    pub fn single_bar(&self, id: &str, value: i32) -> String {
        self.line(ControlType::Bar).field(id).field(value).finish()
    }

    pub fn double_bar(&self, id: &str, value1: i32, value2: i32) -> String {
        self.line(ControlType::Bar)
            .field(id)
            .field(value1)
            .field(value2)
            .finish()
    }

    pub fn knob(&self, id: &str, value: i32) -> String {
        self.line(ControlType::Knob).field(id).field(value).finish()
    }

    pub fn knob_dial(&self, id: &str, value: i32) -> String {
        self.line(ControlType::KnobDial)
            .field(id)
            .field(value)
            .finish()
    }

    /// `\t<dev>\tDIR\t<id>\t<value>[\t<text>]\n`
    pub fn direction(&self, id: &str, value: i32, text: &str) -> String {
        let mut line = self.line(ControlType::Direction).field(id).field(value);
        if !text.is_empty() {
            line = line.field(text);
        }
        line.finish()
    }

    pub fn dial(&self, id: &str, text: &str) -> String {
        self.line(ControlType::Dial).field(id).field(text).finish()
    }

    /// `\t<dev>\tMAP\t<id>\t<lat>\t<lon>\t<message>\n`
    pub fn map(&self, id: &str, latitude: &str, longitude: &str, message: &str) -> String {
        self.line(ControlType::Map)
            .field(id)
            .field(latitude)
            .field(longitude)
            .field(message)
            .finish()
    }

    /// `\t<dev>\tLOG\t<id>\t<time>\t<color>[\t<line>...]\n`
    pub fn event_log<S: AsRef<str>>(&self, id: &str, time: &str, color: &str, lines: &[S]) -> String {
        self.line(ControlType::EventLog)
            .field(id)
            .field(time)
            .field(color)
            .fields(lines.iter().map(|s| s.as_ref()))
            .finish()
    }

    fn graph_line(
        &self,
        control_type: ControlType,
        id: &str,
        line_id: &str,
        name: &str,
        line_type: LineType,
        color: &str,
    ) -> Line {
        self.line(control_type)
            .field(id)
            .field(line_id)
            .field(name)
            .field(line_type.as_str())
            .field(color)
    }

    /// `\t<dev>\tGRPH\t<id>\t<line_id>\t<name>\t<LINETYPE>\t<color>[\t<int>...]\n`
    pub fn graph_line_ints(
        &self,
        id: &str,
        line_id: &str,
        name: &str,
        line_type: LineType,
        color: &str,
        data: &[i32],
    ) -> String {
        self.graph_line(ControlType::Graph, id, line_id, name, line_type, color)
            .fields(data)
            .finish()
    }

    pub fn graph_line_floats(
        &self,
        id: &str,
        line_id: &str,
        name: &str,
        line_type: LineType,
        color: &str,
        data: &[f32],
    ) -> String {
        self.graph_line(ControlType::Graph, id, line_id, name, line_type, color)
            .fields(data.iter().map(|v| format_float(*v)))
            .finish()
    }

    /// Time graph line of `(time, value)` points, each written `time,value`.
    ///
    /// With `break_line` and at least one point, a `<first time>,B` marker
    /// precedes the points so the dashboard does not join this segment to
    /// the previous one.
    #[allow(clippy::too_many_arguments)]
    pub fn time_graph_line_floats(
        &self,
        id: &str,
        line_id: &str,
        name: &str,
        line_type: LineType,
        color: &str,
        points: &[(&str, f32)],
        break_line: bool,
    ) -> String {
        let mut line = self.graph_line(ControlType::TimeGraph, id, line_id, name, line_type, color);
        if break_line {
            if let Some((first, _)) = points.first() {
                line = line.field(format!("{},{}", first, BREAK_MARKER));
            }
        }
        line.fields(
            points
                .iter()
                .map(|(time, value)| format!("{},{}", time, format_float(*value))),
        )
        .finish()
    }

    /// Time graph line of `(time, state)` points, each written `time,T` or
    /// `time,F`.
    pub fn time_graph_line_bools(
        &self,
        id: &str,
        line_id: &str,
        name: &str,
        line_type: LineType,
        color: &str,
        points: &[(&str, bool)],
    ) -> String {
        self.graph_line(ControlType::TimeGraph, id, line_id, name, line_type, color)
            .fields(
                points
                    .iter()
                    .map(|(time, state)| format!("{},{}", time, if *state { "T" } else { "F" })),
            )
            .finish()
    }

    /// `\t<dev>\t<TOKEN>\t<id>[\t<int>...]\n`
    pub fn int_array(
        &self,
        control_type: ControlType,
        id: &str,
        data: &[i32],
    ) -> Result<String, ProtocolError> {
        let token = wire_token(control_type)?;
        Ok(Line::start(&self.device_id)
            .field(token)
            .field(id)
            .fields(data)
            .finish())
    }

    /// `\t<dev>\t<TOKEN>\t<id>[\t<float>...]\n`, two decimals per value.
    pub fn float_array(
        &self,
        control_type: ControlType,
        id: &str,
        data: &[f32],
    ) -> Result<String, ProtocolError> {
        let token = wire_token(control_type)?;
        Ok(Line::start(&self.device_id)
            .field(token)
            .field(id)
            .fields(data.iter().map(|v| format_float(*v)))
            .finish())
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// One basic config entry, `\t<TOKEN>\t<id>\t<title>`, without the
    /// message envelope. Entries can be concatenated and sent together
    /// with [`Encoder::basic_config_with_data`].
    pub fn basic_config_data(
        control_type: ControlType,
        id: &str,
        title: &str,
    ) -> Result<String, ProtocolError> {
        let token = wire_token(control_type)?;
        let mut data = String::with_capacity(token.len() + id.len() + title.len() + 3);
        for field in [token, id, title] {
            data.push(FIELD_SEPARATOR);
            data.push_str(field);
        }
        Ok(data)
    }

    /// `\t<dev>\tCFG\tBAS\t<TOKEN>\t<id>\t<title>\n`
    pub fn basic_config(
        &self,
        control_type: ControlType,
        id: &str,
        title: &str,
    ) -> Result<String, ProtocolError> {
        let data = Self::basic_config_data(control_type, id, title)?;
        Ok(self.basic_config_with_data(&data))
    }

    /// `\t<dev>\tCFG\tBAS<data>\n` where `data` is one or more entries from
    /// [`Encoder::basic_config_data`].
    pub fn basic_config_with_data(&self, data: &str) -> String {
        let mut line = self.line(ControlType::Config).field(BASIC_CONFIG);
        line.buf.push_str(data);
        line.finish()
    }

    /// `\t<dev>\tCFG\t<TOKEN>\t<payload>\n`
    pub fn full_config(
        &self,
        control_type: ControlType,
        payload: &str,
    ) -> Result<String, ProtocolError> {
        let token = wire_token(control_type)?;
        Ok(self
            .line(ControlType::Config)
            .field(token)
            .field(payload)
            .finish())
    }

    /// Full config message for a structured shape.
    pub fn config<C: ConfigPayload + ?Sized>(&self, cfg: &C) -> String {
        // Every shape configures a kind with a wire token.
        self.line(ControlType::Config)
            .field(cfg.control_type().token())
            .field(cfg.to_payload())
            .finish()
    }
}

// -------------------------------------------------------------------------
// Dashboard-side requests
// -------------------------------------------------------------------------

/// Discovery broadcast: `\tWHO\n`.
pub fn who_request() -> String {
    Line::start(ControlType::Who.token()).finish()
}

pub fn connect_request(device_id: &str) -> String {
    Line::start(device_id).field(ControlType::Connect.token()).finish()
}

pub fn config_request(device_id: &str) -> String {
    Line::start(device_id).field(ControlType::Config.token()).finish()
}

pub fn status_request(device_id: &str) -> String {
    Line::start(device_id).field(ControlType::Status.token()).finish()
}

/// Control update sent from a dashboard, e.g. `\t<dev>\tSLDR\t<id>\t42\n`.
pub fn control_request<S: AsRef<str>>(
    device_id: &str,
    control_type: ControlType,
    id: &str,
    payloads: &[S],
) -> Result<String, ProtocolError> {
    let token = wire_token(control_type)?;
    Ok(Line::start(device_id)
        .field(token)
        .field(id)
        .fields(payloads.iter().map(|s| s.as_ref()))
        .finish())
}
