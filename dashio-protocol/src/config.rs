//! Structured configuration payloads.
//!
//! A dashboard learns a device's layout from `CFG` messages. Each control
//! kind has a fixed set of keys written in a fixed order; dashboards rely on
//! that order, so every shape here writes its entries explicitly.
//!
//! All shapes deserialize from YAML/JSON (snake_case keys, every field
//! optional) so a device layout can live in a configuration file.

use crate::control::ControlType;
use crate::payload::StructuredPayloadWriter;
use serde::{Deserialize, Serialize};

/// A configuration shape that can be written as a structured payload.
pub trait ConfigPayload {
    /// Control kind announced in the `CFG` message.
    fn control_type(&self) -> ControlType;

    /// Writes the entries in their declared order, marking the final one.
    fn write_entries(&self, writer: &mut StructuredPayloadWriter);

    /// Renders the structured payload.
    fn to_payload(&self) -> String {
        let mut writer = StructuredPayloadWriter::new();
        self.write_entries(&mut writer);
        writer.finish()
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Where a control's title box is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePosition {
    #[default]
    Top,
    Bottom,
    None,
}

impl TitlePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitlePosition::Top => "TOP",
            TitlePosition::Bottom => "BOTTOM",
            TitlePosition::None => "NONE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    Basic,
    #[default]
    Group,
}

impl LabelStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelStyle::Basic => "BASIC",
            LabelStyle::Group => "GROUP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialNumberPosition {
    Left,
    Right,
    Center,
    #[default]
    Off,
}

impl DialNumberPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialNumberPosition::Left => "LEFT",
            DialNumberPosition::Right => "RIGHT",
            DialNumberPosition::Center => "CENTER",
            DialNumberPosition::Off => "OFF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnobStyle {
    #[default]
    Normal,
    Pan,
}

impl KnobStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnobStyle::Normal => "NORMAL",
            KnobStyle::Pan => "PAN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialStyle {
    Pie,
    PieInverted,
    #[default]
    Bar,
}

impl DialStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialStyle::Pie => "PIE",
            DialStyle::PieInverted => "PIEINV",
            DialStyle::Bar => "BAR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionStyle {
    #[default]
    Nsew,
    Deg,
    DegPs,
}

impl DirectionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionStyle::Nsew => "NSEW",
            DirectionStyle::Deg => "DEG",
            DirectionStyle::DegPs => "DEGPS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    #[default]
    None,
    Num,
    DateTime,
    DateTimeLong,
    Interval,
}

impl TextFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::None => "NONE",
            TextFormat::Num => "NUM",
            TextFormat::DateTime => "DATETIME",
            TextFormat::DateTimeLong => "DTLONG",
            TextFormat::Interval => "INTVL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardType {
    #[default]
    None,
    Hex,
    All,
    Num,
    Int,
    Date,
    Time,
    DateTime,
    Interval,
}

impl KeyboardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyboardType::None => "NONE",
            KeyboardType::Hex => "HEX",
            KeyboardType::All => "ALL",
            KeyboardType::Num => "NUM",
            KeyboardType::Int => "INT",
            KeyboardType::Date => "DATE",
            KeyboardType::Time => "TIME",
            KeyboardType::DateTime => "DATETIME",
            KeyboardType::Interval => "INTVL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Right,
    #[default]
    Center,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "LEFT",
            TextAlign::Right => "RIGHT",
            TextAlign::Center => "CENTER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarStyle {
    #[default]
    Solid,
    Segmented,
}

impl BarStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarStyle::Solid => "SOLID",
            BarStyle::Segmented => "SEG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxisLabelsStyle {
    OnLines,
    #[default]
    Between,
}

impl XAxisLabelsStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            XAxisLabelsStyle::OnLines => "ON",
            XAxisLabelsStyle::Between => "BETWEEN",
        }
    }
}

/// Rendering of a graph line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    #[default]
    Line,
    Bar,
    SegmentedBar,
    PeakBar,
}

impl LineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineType::Line => "LINE",
            LineType::Bar => "BAR",
            LineType::SegmentedBar => "SEGBAR",
            LineType::PeakBar => "PEAKBAR",
        }
    }
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// Position and size of a control, as ratios of its device view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsRect {
    pub x_position_ratio: f32,
    pub y_position_ratio: f32,
    pub width_ratio: f32,
    pub height_ratio: f32,
}

/// Fields shared by every dashboard control, written first in its payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlHeader {
    pub control_id: String,
    pub parent_id: String,
    #[serde(flatten)]
    pub graphics_rect: GraphicsRect,
    pub title: String,
    pub title_position: TitlePosition,
}

impl ControlHeader {
    fn write(&self, writer: &mut StructuredPayloadWriter, last: bool) {
        let rect = &self.graphics_rect;
        writer
            .add_str("controlID", &self.control_id, false)
            .add_str("parentID", &self.parent_id, false)
            .add_float("xPositionRatio", rect.x_position_ratio, false)
            .add_float("yPositionRatio", rect.y_position_ratio, false)
            .add_float("widthRatio", rect.width_ratio, false)
            .add_float("heightRatio", rect.height_ratio, false)
            .add_str("title", &self.title, false)
            .add_str("titlePosition", self.title_position.as_str(), last);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCfg {
    pub num_device_views: i32,
    pub device_setup: String,
}

impl ConfigPayload for DeviceCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Device
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        writer
            .add_int("numDeviceViews", self.num_device_views.into(), false)
            .add_str("deviceSetup", &self.device_setup, true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceViewCfg {
    pub control_id: String,
    pub title: String,
    pub icon_name: String,
    pub color: String,
    pub share_column: bool,
    pub num_columns: i32,
    pub ctrl_max_font_size: i32,
    pub ctrl_border_on: bool,
    pub ctrl_border_color: String,
    pub ctrl_color: String,
    pub ctrl_bkgnd_color: String,
    pub ctrl_bkgnd_transparency: i32,
    pub ctrl_title_font_size: i32,
    pub ctrl_title_box_color: String,
    pub ctrl_title_box_transparency: i32,
}

impl Default for DeviceViewCfg {
    fn default() -> Self {
        Self {
            control_id: String::new(),
            title: String::new(),
            icon_name: String::new(),
            color: String::new(),
            share_column: true,
            num_columns: 1,
            ctrl_max_font_size: 20,
            ctrl_border_on: true,
            ctrl_border_color: String::new(),
            ctrl_color: String::new(),
            ctrl_bkgnd_color: String::new(),
            ctrl_bkgnd_transparency: 0,
            ctrl_title_font_size: 16,
            ctrl_title_box_color: String::new(),
            ctrl_title_box_transparency: 0,
        }
    }
}

impl ConfigPayload for DeviceViewCfg {
    fn control_type(&self) -> ControlType {
        ControlType::DeviceView
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        writer
            .add_str("controlID", &self.control_id, false)
            .add_str("title", &self.title, false)
            .add_str("iconName", &self.icon_name, false)
            .add_str("color", &self.color, false)
            .add_bool("shareColumn", self.share_column, false)
            .add_int("numColumns", self.num_columns.into(), false)
            // Control defaults
            .add_int("ctrlMaxFontSize", self.ctrl_max_font_size.into(), false)
            .add_bool("ctrlBorderOn", self.ctrl_border_on, false)
            .add_str("ctrlBorderColor", &self.ctrl_border_color, false)
            .add_str("ctrlColor", &self.ctrl_color, false)
            .add_str("ctrlBkgndColor", &self.ctrl_bkgnd_color, false)
            .add_int(
                "ctrlBkgndTransparency",
                self.ctrl_bkgnd_transparency.into(),
                false,
            )
            // Title box defaults
            .add_int("ctrlTitleFontSize", self.ctrl_title_font_size.into(), false)
            .add_str("ctrlTitleBoxColor", &self.ctrl_title_box_color, false)
            .add_int(
                "ctrlTitleBoxTransparency",
                self.ctrl_title_box_transparency.into(),
                true,
            );
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BleConnCfg {
    pub service_uuid: String,
    pub read_uuid: String,
    pub write_uuid: String,
}

impl ConfigPayload for BleConnCfg {
    fn control_type(&self) -> ControlType {
        ControlType::BleConnection
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        writer
            .add_str("serviceUUID", &self.service_uuid, false)
            .add_str("readUUID", &self.read_uuid, false)
            .add_str("writeUUID", &self.write_uuid, true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpConnCfg {
    pub ip_address: String,
    pub port: u16,
}

impl Default for TcpConnCfg {
    fn default() -> Self {
        Self {
            ip_address: String::new(),
            port: crate::DEFAULT_PORT,
        }
    }
}

impl ConfigPayload for TcpConnCfg {
    fn control_type(&self) -> ControlType {
        ControlType::TcpConnection
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        writer
            .add_str("ipAddress", &self.ip_address, false)
            .add_int("port", self.port.into(), true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConnCfg {
    pub user_name: String,
    pub host_url: String,
}

impl ConfigPayload for MqttConnCfg {
    fn control_type(&self) -> ControlType {
        ControlType::MqttConnection
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        writer
            .add_str("userName", &self.user_name, false)
            .add_str("hostURL", &self.host_url, true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmCfg {
    pub control_id: String,
    pub description: String,
    pub sound_name: String,
}

impl ConfigPayload for AlarmCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Alarm
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        writer
            .add_str("controlID", &self.control_id, false)
            .add_str("description", &self.description, false)
            .add_str("soundName", &self.sound_name, true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub style: LabelStyle,
    pub color: String,
}

impl ConfigPayload for LabelCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Label
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("style", self.style.as_str(), false)
            .add_str("color", &self.color, true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub button_enabled: bool,
    pub icon_name: String,
    pub text: String,
    pub off_color: String,
    pub on_color: String,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            button_enabled: true,
            icon_name: String::new(),
            text: String::new(),
            off_color: String::new(),
            on_color: String::new(),
        }
    }
}

impl ConfigPayload for ButtonCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Button
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_bool("buttonEnabled", self.button_enabled, false)
            .add_str("iconName", &self.icon_name, false)
            .add_str("text", &self.text, false)
            .add_str("offColor", &self.off_color, false)
            .add_str("onColor", &self.on_color, true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub icon_name: String,
    pub text: String,
}

impl ConfigPayload for MenuCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Menu
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("iconName", &self.icon_name, false)
            .add_str("text", &self.text, true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonGroupCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub icon_name: String,
    pub text: String,
    pub grid_view: bool,
}

impl ConfigPayload for ButtonGroupCfg {
    fn control_type(&self) -> ControlType {
        ControlType::ButtonGroup
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("iconName", &self.icon_name, false)
            .add_str("text", &self.text, false)
            .add_bool("gridView", self.grid_view, true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
}

impl ConfigPayload for EventLogCfg {
    fn control_type(&self) -> ControlType {
        ControlType::EventLog
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub min: f32,
    pub max: f32,
    pub red_value: f32,
    pub show_min_max: bool,
    pub style: KnobStyle,
    pub knob_color: String,
    pub send_only_on_release: bool,
    pub dial_follows_knob: bool,
    pub dial_color: String,
}

impl Default for KnobCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            min: 0.0,
            max: 100.0,
            red_value: 75.0,
            show_min_max: false,
            style: KnobStyle::default(),
            knob_color: String::new(),
            send_only_on_release: true,
            dial_follows_knob: false,
            dial_color: String::new(),
        }
    }
}

impl ConfigPayload for KnobCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Knob
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_float("min", self.min, false)
            .add_float("max", self.max, false)
            .add_float("redValue", self.red_value, false)
            .add_bool("showMinMax", self.show_min_max, false)
            .add_str("style", self.style.as_str(), false)
            .add_str("knobColor", &self.knob_color, false)
            .add_bool("sendOnlyOnRelease", self.send_only_on_release, false)
            .add_bool("dialFollowsKnob", self.dial_follows_knob, false)
            .add_str("dialColor", &self.dial_color, true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub min: f32,
    pub max: f32,
    pub red_value: f32,
    pub dial_fill_color: String,
    pub pointer_color: String,
    pub number_position: DialNumberPosition,
    pub show_min_max: bool,
    pub style: DialStyle,
    pub units: String,
    pub precision: i32,
}

impl Default for DialCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            min: 0.0,
            max: 100.0,
            red_value: 75.0,
            dial_fill_color: String::new(),
            pointer_color: String::new(),
            number_position: DialNumberPosition::default(),
            show_min_max: false,
            style: DialStyle::default(),
            units: String::new(),
            precision: 2,
        }
    }
}

impl ConfigPayload for DialCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Dial
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_float("min", self.min, false)
            .add_float("max", self.max, false)
            .add_float("redValue", self.red_value, false)
            .add_str("dialFillColor", &self.dial_fill_color, false)
            .add_str("pointerColor", &self.pointer_color, false)
            .add_str("numberPosition", self.number_position.as_str(), false)
            .add_bool("showMinMax", self.show_min_max, false)
            .add_str("style", self.style.as_str(), false)
            .add_str("units", &self.units, false)
            .add_int("precision", self.precision.into(), true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub pointer_color: String,
    pub style: DirectionStyle,
    pub cal_angle: i32,
    pub units: String,
    pub precision: i32,
}

impl Default for DirectionCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            pointer_color: String::new(),
            style: DirectionStyle::default(),
            cal_angle: 0,
            units: String::new(),
            precision: 2,
        }
    }
}

impl ConfigPayload for DirectionCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Direction
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("pointerColor", &self.pointer_color, false)
            .add_str("style", self.style.as_str(), false)
            .add_int("calAngle", self.cal_angle.into(), false)
            .add_str("units", &self.units, false)
            .add_int("precision", self.precision.into(), true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoxCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub format: TextFormat,
    pub text_align: TextAlign,
    pub units: String,
    pub precision: i32,
    pub kbd_type: KeyboardType,
    pub close_kbd_on_send: bool,
}

impl Default for TextBoxCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            format: TextFormat::default(),
            text_align: TextAlign::default(),
            units: String::new(),
            precision: 2,
            kbd_type: KeyboardType::All,
            close_kbd_on_send: true,
        }
    }
}

impl ConfigPayload for TextBoxCfg {
    fn control_type(&self) -> ControlType {
        ControlType::TextBox
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("format", self.format.as_str(), false)
            .add_str("textAlign", self.text_align.as_str(), false)
            .add_str("units", &self.units, false)
            .add_int("precision", self.precision.into(), false)
            .add_str("kbdType", self.kbd_type.as_str(), false)
            .add_bool("closeKbdOnSend", self.close_kbd_on_send, true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
}

impl ConfigPayload for SelectorCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Selector
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub min: f32,
    pub max: f32,
    pub red_value: f32,
    pub show_min_max: bool,
    pub slider_enabled: bool,
    pub knob_color: String,
    pub send_only_on_release: bool,
    pub bar_follows_slider: bool,
    pub bar_color: String,
    pub bar_style: BarStyle,
}

impl Default for SliderCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            min: 0.0,
            max: 100.0,
            red_value: 75.0,
            show_min_max: false,
            slider_enabled: true,
            knob_color: String::new(),
            send_only_on_release: true,
            bar_follows_slider: false,
            bar_color: String::new(),
            bar_style: BarStyle::default(),
        }
    }
}

impl ConfigPayload for SliderCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Slider
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_float("min", self.min, false)
            .add_float("max", self.max, false)
            .add_float("redValue", self.red_value, false)
            .add_bool("showMinMax", self.show_min_max, false)
            .add_bool("sliderEnabled", self.slider_enabled, false)
            .add_str("knobColor", &self.knob_color, false)
            .add_bool("sendOnlyOnRelease", self.send_only_on_release, false)
            .add_bool("barFollowsSlider", self.bar_follows_slider, false)
            .add_str("barColor", &self.bar_color, false)
            .add_str("barStyle", self.bar_style.as_str(), true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub x_axis_label: String,
    pub x_axis_min: f32,
    pub x_axis_max: f32,
    pub x_axis_num_bars: i32,
    pub x_axis_labels_style: XAxisLabelsStyle,
    pub y_axis_label: String,
    pub y_axis_min: f32,
    pub y_axis_max: f32,
    pub y_axis_num_bars: i32,
}

impl Default for GraphCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            x_axis_label: String::new(),
            x_axis_min: 0.0,
            x_axis_max: 100.0,
            x_axis_num_bars: 6,
            x_axis_labels_style: XAxisLabelsStyle::default(),
            y_axis_label: String::new(),
            y_axis_min: 0.0,
            y_axis_max: 100.0,
            y_axis_num_bars: 6,
        }
    }
}

impl ConfigPayload for GraphCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Graph
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("xAxisLabel", &self.x_axis_label, false)
            .add_float("xAxisMin", self.x_axis_min, false)
            .add_float("xAxisMax", self.x_axis_max, false)
            .add_int("xAxisNumBars", self.x_axis_num_bars.into(), false)
            .add_str("xAxisLabelsStyle", self.x_axis_labels_style.as_str(), false)
            .add_str("yAxisLabel", &self.y_axis_label, false)
            .add_float("yAxisMin", self.y_axis_min, false)
            .add_float("yAxisMax", self.y_axis_max, false)
            .add_int("yAxisNumBars", self.y_axis_num_bars.into(), true);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGraphCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
    pub y_axis_label: String,
    pub y_axis_min: f32,
    pub y_axis_max: f32,
    pub y_axis_num_bars: i32,
}

impl Default for TimeGraphCfg {
    fn default() -> Self {
        Self {
            header: ControlHeader::default(),
            y_axis_label: String::new(),
            y_axis_min: 0.0,
            y_axis_max: 100.0,
            y_axis_num_bars: 6,
        }
    }
}

impl ConfigPayload for TimeGraphCfg {
    fn control_type(&self) -> ControlType {
        ControlType::TimeGraph
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, false);
        writer
            .add_str("yAxisLabel", &self.y_axis_label, false)
            .add_float("yAxisMin", self.y_axis_min, false)
            .add_float("yAxisMax", self.y_axis_max, false)
            .add_int("yAxisNumBars", self.y_axis_num_bars.into(), true);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapCfg {
    #[serde(flatten)]
    pub header: ControlHeader,
}

impl ConfigPayload for MapCfg {
    fn control_type(&self) -> ControlType {
        ControlType::Map
    }

    fn write_entries(&self, writer: &mut StructuredPayloadWriter) {
        self.header.write(writer, true);
    }
}

/// Any configuration shape, tagged by `kind` when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlConfig {
    DeviceView(DeviceViewCfg),
    BleConnection(BleConnCfg),
    TcpConnection(TcpConnCfg),
    MqttConnection(MqttConnCfg),
    Alarm(AlarmCfg),
    Label(LabelCfg),
    Button(ButtonCfg),
    Menu(MenuCfg),
    ButtonGroup(ButtonGroupCfg),
    EventLog(EventLogCfg),
    Knob(KnobCfg),
    Dial(DialCfg),
    Direction(DirectionCfg),
    TextBox(TextBoxCfg),
    Selector(SelectorCfg),
    Slider(SliderCfg),
    Graph(GraphCfg),
    TimeGraph(TimeGraphCfg),
    Map(MapCfg),
}

impl ControlConfig {
    /// Returns the shape as a trait object.
    pub fn as_payload(&self) -> &dyn ConfigPayload {
        match self {
            ControlConfig::DeviceView(c) => c,
            ControlConfig::BleConnection(c) => c,
            ControlConfig::TcpConnection(c) => c,
            ControlConfig::MqttConnection(c) => c,
            ControlConfig::Alarm(c) => c,
            ControlConfig::Label(c) => c,
            ControlConfig::Button(c) => c,
            ControlConfig::Menu(c) => c,
            ControlConfig::ButtonGroup(c) => c,
            ControlConfig::EventLog(c) => c,
            ControlConfig::Knob(c) => c,
            ControlConfig::Dial(c) => c,
            ControlConfig::Direction(c) => c,
            ControlConfig::TextBox(c) => c,
            ControlConfig::Selector(c) => c,
            ControlConfig::Slider(c) => c,
            ControlConfig::Graph(c) => c,
            ControlConfig::TimeGraph(c) => c,
            ControlConfig::Map(c) => c,
        }
    }

    /// Control id, if this shape describes a dashboard control.
    pub fn control_id(&self) -> Option<&str> {
        let id = match self {
            ControlConfig::DeviceView(c) => &c.control_id,
            ControlConfig::Alarm(c) => &c.control_id,
            ControlConfig::Label(c) => &c.header.control_id,
            ControlConfig::Button(c) => &c.header.control_id,
            ControlConfig::Menu(c) => &c.header.control_id,
            ControlConfig::ButtonGroup(c) => &c.header.control_id,
            ControlConfig::EventLog(c) => &c.header.control_id,
            ControlConfig::Knob(c) => &c.header.control_id,
            ControlConfig::Dial(c) => &c.header.control_id,
            ControlConfig::Direction(c) => &c.header.control_id,
            ControlConfig::TextBox(c) => &c.header.control_id,
            ControlConfig::Selector(c) => &c.header.control_id,
            ControlConfig::Slider(c) => &c.header.control_id,
            ControlConfig::Graph(c) => &c.header.control_id,
            ControlConfig::TimeGraph(c) => &c.header.control_id,
            ControlConfig::Map(c) => &c.header.control_id,
            ControlConfig::BleConnection(_)
            | ControlConfig::TcpConnection(_)
            | ControlConfig::MqttConnection(_) => return None,
        };
        Some(id.as_str())
    }
}
