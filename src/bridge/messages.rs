use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryCounts, MessageRecord};

/// Messages pushed from the watcher toward the popup side. Wire-compatible
/// with the extension runtime message shapes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Emitted exactly once, at the NotReady → Ready transition.
    #[serde(rename = "CONTENT_SCRIPT_READY", rename_all = "camelCase")]
    ContentScriptReady {
        url: String,
        timestamp: DateTime<Utc>,
    },
    /// Emitted after every completed scan, best-effort.
    #[serde(rename = "UNREAD_EMAILS_UPDATED", rename_all = "camelCase")]
    UnreadEmailsUpdated {
        total_count: u32,
        tab_counts: CategoryCounts,
        visible_unread: Vec<MessageRecord>,
    },
}

/// Requests the popup side can make of the watcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "GET_UNREAD_COUNTS")]
    GetUnreadCounts,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::CountsSnapshot;

    use super::*;

    #[test]
    fn update_message_matches_the_runtime_wire_shape() {
        let message = OutboundMessage::UnreadEmailsUpdated {
            total_count: 8,
            tab_counts: CategoryCounts {
                primary: 5,
                social: 3,
                ..CategoryCounts::default()
            },
            visible_unread: vec![MessageRecord {
                id: "row-0".to_string(),
                sender: "notifications@github.com".to_string(),
                subject: "CI failed".to_string(),
                snippet: "build broke".to_string(),
                is_unread: true,
                is_important: true,
            }],
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "UNREAD_EMAILS_UPDATED");
        assert_eq!(value["totalCount"], 8);
        assert_eq!(value["tabCounts"]["primary"], 5);
        assert_eq!(value["visibleUnread"][0]["isImportant"], true);
        assert_eq!(value["visibleUnread"][0]["isUnread"], true);
    }

    #[test]
    fn ready_message_carries_url_and_timestamp() {
        let message = OutboundMessage::ContentScriptReady {
            url: "https://mail.google.com/mail/u/0/".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "CONTENT_SCRIPT_READY");
        assert!(value["url"].as_str().unwrap().contains("mail.google.com"));
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn counts_query_parses_from_the_wire() {
        let parsed: InboundMessage =
            serde_json::from_value(json!({ "type": "GET_UNREAD_COUNTS" })).unwrap();
        assert!(matches!(parsed, InboundMessage::GetUnreadCounts));
    }

    #[test]
    fn counts_reply_flattens_per_category_fields() {
        let reply = CountsSnapshot {
            total: 9,
            counts: CategoryCounts {
                primary: 4,
                promotions: 5,
                ..CategoryCounts::default()
            },
            visible_unread: Vec::new(),
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["total"], 9);
        assert_eq!(value["primary"], 4);
        assert_eq!(value["promotions"], 5);
        assert_eq!(value["forums"], 0);
        assert!(value["visibleUnread"].as_array().unwrap().is_empty());
    }
}
