use serde::{Deserialize, Serialize};

/// One rendered message row, rebuilt from the host page on every scan.
/// `id` is only stable within a single page snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub snippet: String,
    pub is_unread: bool,
    pub is_important: bool,
}
