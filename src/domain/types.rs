use serde::{Deserialize, Serialize};

use super::message::MessageRecord;

/// Fixed set of inbox tabs used to bucket aggregate unread counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Primary,
    Social,
    Promotions,
    Updates,
    Forums,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Primary,
        Category::Social,
        Category::Promotions,
        Category::Updates,
        Category::Forums,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Primary => "Primary",
            Category::Social => "Social",
            Category::Promotions => "Promotions",
            Category::Updates => "Updates",
            Category::Forums => "Forums",
        }
    }
}

/// Per-tab unread counts sourced from the tab badges. `total` is the sum of
/// the badges, not the number of rendered rows; the page only renders one
/// visible page of messages, so the two can legitimately disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub primary: u32,
    pub social: u32,
    pub promotions: u32,
    pub updates: u32,
    pub forums: u32,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Primary => self.primary,
            Category::Social => self.social,
            Category::Promotions => self.promotions,
            Category::Updates => self.updates,
            Category::Forums => self.forums,
        }
    }

    pub fn set(&mut self, category: Category, value: u32) {
        match category {
            Category::Primary => self.primary = value,
            Category::Social => self.social = value,
            Category::Promotions => self.promotions = value,
            Category::Updates => self.updates = value,
            Category::Forums => self.forums = value,
        }
    }

    pub fn total(&self) -> u32 {
        self.primary + self.social + self.promotions + self.updates + self.forums
    }
}

/// Reply payload for an on-demand counts query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsSnapshot {
    pub total: u32,
    #[serde(flatten)]
    pub counts: CategoryCounts,
    pub visible_unread: Vec<MessageRecord>,
}
