use crate::config::RulesConfig;

/// Senders whose mail is always highlighted.
const DEFAULT_IMPORTANT_SENDERS: &[&str] = &[
    "google.com",
    "github.com",
    "calendar-notification@google.com",
    "linkedin.com",
    "slack.com",
];

/// Keywords that mark a message as important wherever they appear.
const DEFAULT_IMPORTANT_KEYWORDS: &[&str] = &[
    "urgent",
    "action required",
    "invitation",
    "meeting",
    "interview",
    "offer",
    "invoice",
    "receipt",
    "password",
    "security alert",
    "deadline",
    "fahad jameel",
];

/// Case-insensitive substring rules deciding which messages get highlighted.
///
/// Sender rules match against the sender field only and take precedence;
/// keyword rules match against sender, subject, and snippet alike.
#[derive(Debug, Clone)]
pub struct ImportanceRules {
    important_senders: Vec<String>,
    important_keywords: Vec<String>,
}

impl ImportanceRules {
    pub fn new<S: AsRef<str>>(senders: &[S], keywords: &[S]) -> Self {
        Self {
            important_senders: normalize(senders),
            important_keywords: normalize(keywords),
        }
    }

    pub fn from_config(config: &RulesConfig) -> Self {
        match (&config.important_senders, &config.important_keywords) {
            (Some(senders), Some(keywords)) => Self::new(senders, keywords),
            (Some(senders), None) => {
                Self::new(&as_refs(senders), DEFAULT_IMPORTANT_KEYWORDS)
            }
            (None, Some(keywords)) => {
                Self::new(DEFAULT_IMPORTANT_SENDERS, &as_refs(keywords))
            }
            (None, None) => Self::default(),
        }
    }

    /// Decides importance from the three text fields. Pure and deterministic;
    /// read state plays no part in the decision.
    pub fn is_important(&self, sender: &str, subject: &str, snippet: &str) -> bool {
        let sender = sender.to_lowercase();
        let subject = subject.to_lowercase();
        let snippet = snippet.to_lowercase();

        if self
            .important_senders
            .iter()
            .any(|important| sender.contains(important.as_str()))
        {
            return true;
        }

        self.important_keywords.iter().any(|keyword| {
            sender.contains(keyword.as_str())
                || subject.contains(keyword.as_str())
                || snippet.contains(keyword.as_str())
        })
    }
}

impl Default for ImportanceRules {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORTANT_SENDERS, DEFAULT_IMPORTANT_KEYWORDS)
    }
}

// Empty entries are dropped here so an empty needle can never act as a
// match-everything rule.
fn normalize<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.as_ref().trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn as_refs(entries: &[String]) -> Vec<&str> {
    entries.iter().map(String::as_str).collect()
}
