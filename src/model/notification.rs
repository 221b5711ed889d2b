// Reminder notifications returned by the model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::lenient;

loose_enum! {
    Urgency {
        High => "high",
        Medium => "medium",
        Low => "low",
    } else Unknown => "unknown"
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Urgency {
    /// Sort key: most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
            Self::Unknown => 3,
        }
    }
}

loose_enum! {
    NotificationKind {
        Deadline => "deadline",
        Reminder => "reminder",
        Warning => "warning",
        Celebration => "celebration",
    } else Other => "other"
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub message: String,

    #[serde(default)]
    pub urgency: Urgency,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub action: String,

    /// "YYYY-MM-DD HH:MM"
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub send_at: String,

    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

const SEND_AT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

impl Notification {
    pub fn send_at_parsed(&self) -> Option<NaiveDateTime> {
        let raw = self.send_at.trim();
        SEND_AT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    /// Stable identifier used to avoid delivering the same reminder twice.
    ///
    /// The model regenerates the feed on every poll, so identity is derived
    /// from content rather than assigned.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.message.trim().as_bytes());
        hasher.update(b"|");
        hasher.update(self.send_at.trim().as_bytes());
        hasher.update(b"|");
        hasher.update(self.kind.as_str().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

/// Order a feed by urgency, then by send time (unparseable times last)
pub fn sort_feed(feed: &mut [Notification]) {
    feed.sort_by_key(|n| {
        (
            n.urgency.rank(),
            n.send_at_parsed().unwrap_or(NaiveDateTime::MAX),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notif(message: &str, urgency: &str, send_at: &str) -> Notification {
        serde_json::from_value(json!({
            "message": message,
            "urgency": urgency,
            "action": "Open the syllabus",
            "send_at": send_at,
            "type": "reminder"
        }))
        .unwrap()
    }

    #[test]
    fn test_send_at_formats() {
        assert!(notif("a", "high", "2025-09-01 09:00").send_at_parsed().is_some());
        assert!(notif("a", "high", "2025-09-01T09:00:00").send_at_parsed().is_some());
        assert!(notif("a", "high", "tomorrow morning").send_at_parsed().is_none());
    }

    #[test]
    fn test_id_is_stable_and_content_based() {
        let a = notif("Start Project 1", "high", "2025-09-01 09:00");
        let b = notif("Start Project 1", "low", "2025-09-01 09:00");
        let c = notif("Start Project 2", "high", "2025-09-01 09:00");

        assert_eq!(a.id(), b.id(), "urgency is not part of identity");
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id().len(), 16);
    }

    #[test]
    fn test_sort_feed_by_urgency_then_time() {
        let mut feed = vec![
            notif("low", "low", "2025-09-01 08:00"),
            notif("high-late", "high", "2025-09-02 08:00"),
            notif("unknown", "whenever", "2025-09-01 07:00"),
            notif("high-early", "HIGH", "2025-09-01 08:00"),
            notif("medium", "medium", "bad date"),
        ];

        sort_feed(&mut feed);

        let order: Vec<&str> = feed.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(order, vec!["high-early", "high-late", "medium", "low", "unknown"]);
    }

    #[test]
    fn test_null_urgency_and_kind_fall_back() {
        let n: Notification =
            serde_json::from_value(json!({"message": "hi", "urgency": null, "type": false})).unwrap();
        assert_eq!(n.urgency, Urgency::Unknown);
        assert_eq!(n.kind, NotificationKind::Other);
    }

    #[test]
    fn test_unknown_type_serializes_as_other() {
        let n: Notification = serde_json::from_value(json!({"message": "hi", "type": "nudge"})).unwrap();
        assert_eq!(n.kind, NotificationKind::Other);
        assert_eq!(serde_json::to_value(&n).unwrap()["type"], "other");
    }
}
