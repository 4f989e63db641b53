//! Publish/subscribe topic names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Purpose of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    Data,
    Control,
    Alarm,
    Announce,
    /// Last-will messages share the data topic.
    Will,
}

impl TopicKind {
    /// Last path component of the topic.
    pub fn tip(self) -> &'static str {
        match self {
            TopicKind::Data | TopicKind::Will => "data",
            TopicKind::Control => "control",
            TopicKind::Alarm => "alarm",
            TopicKind::Announce => "announce",
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tip())
    }
}

/// Builds `<user>/<device_id>/<tip>`.
pub fn topic(user: &str, device_id: &str, kind: TopicKind) -> String {
    format!("{}/{}/{}", user, device_id, kind.tip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(topic("me", "abc123", TopicKind::Data), "me/abc123/data");
        assert_eq!(topic("me", "abc123", TopicKind::Control), "me/abc123/control");
        assert_eq!(topic("me", "abc123", TopicKind::Alarm), "me/abc123/alarm");
        assert_eq!(topic("me", "abc123", TopicKind::Announce), "me/abc123/announce");
    }

    #[test]
    fn test_will_uses_data_tip() {
        assert_eq!(
            topic("me", "abc123", TopicKind::Will),
            topic("me", "abc123", TopicKind::Data)
        );
        assert_eq!(TopicKind::Will.to_string(), "data");
    }

    #[test]
    fn test_parse_kind() {
        let kind: TopicKind = serde_yaml::from_str("announce").unwrap();
        assert_eq!(kind, TopicKind::Announce);
    }
}
