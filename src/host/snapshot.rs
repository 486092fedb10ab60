use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::Category;

use super::selectors::ROW_STATE_CLASSES;
use super::{ElementRef, HostPage, Mutation, Selector};

/// Serde model of one rendered page of the host document. The row fields
/// carry the raw signals a DOM scraper would see, not derived state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSnapshot {
    pub url: String,
    pub main_container: bool,
    pub rows: Vec<RowSnapshot>,
    pub tabs: TabBadges,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowSnapshot {
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub snippet: Option<String>,
    pub row_classes: Vec<String>,
    pub aria_label: Option<String>,
    pub font_weight: Option<String>,
}

/// Raw badge text per tab, exactly as rendered (may carry separators or be
/// absent entirely).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabBadges {
    pub primary: Option<String>,
    pub social: Option<String>,
    pub promotions: Option<String>,
    pub updates: Option<String>,
    pub forums: Option<String>,
}

impl TabBadges {
    pub fn get(&self, category: Category) -> Option<&str> {
        match category {
            Category::Primary => self.primary.as_deref(),
            Category::Social => self.social.as_deref(),
            Category::Promotions => self.promotions.as_deref(),
            Category::Updates => self.updates.as_deref(),
            Category::Forums => self.forums.as_deref(),
        }
    }
}

const BODY: u64 = 1;
const CONTAINER: u64 = 2;
const BADGE_BASE: u64 = 0x10;
const ROW_BASE: u64 = 0x1000;
const ROW_SLOTS: u64 = 4;

const SLOT_ROW: u64 = 0;
const SLOT_SENDER: u64 = 1;
const SLOT_SUBJECT: u64 = 2;
const SLOT_SNIPPET: u64 = 3;

fn row_ref(index: usize, slot: u64) -> ElementRef {
    ElementRef(ROW_BASE + index as u64 * ROW_SLOTS + slot)
}

fn badge_ref(category: Category) -> ElementRef {
    let position = Category::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(0) as u64;
    ElementRef(BADGE_BASE + position)
}

enum Decoded {
    Body,
    Container,
    Badge(Category),
    Row { index: usize, slot: u64 },
}

fn decode(element: ElementRef) -> Option<Decoded> {
    match element.0 {
        BODY => Some(Decoded::Body),
        CONTAINER => Some(Decoded::Container),
        id if (BADGE_BASE..BADGE_BASE + Category::ALL.len() as u64).contains(&id) => {
            Some(Decoded::Badge(Category::ALL[(id - BADGE_BASE) as usize]))
        }
        id if id >= ROW_BASE => Some(Decoded::Row {
            index: ((id - ROW_BASE) / ROW_SLOTS) as usize,
            slot: (id - ROW_BASE) % ROW_SLOTS,
        }),
        _ => None,
    }
}

/// Host page backed by an in-memory [`PageSnapshot`]. Swapping snapshots in
/// via [`SnapshotHost::apply`] synthesizes the mutation records a subtree
/// observer on a live document would have reported.
pub struct SnapshotHost {
    snapshot: RwLock<PageSnapshot>,
    markers: RwLock<HashMap<u64, HashSet<String>>>,
}

impl SnapshotHost {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            markers: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the current snapshot and reports what changed. Badge or text
    /// edits surface as character-data mutations only; the watcher ignores
    /// those, which is what keeps badge changes observable solely through
    /// fresh reads.
    pub fn apply(&self, next: PageSnapshot) -> Vec<Mutation> {
        let mut guard = self.snapshot.write();
        if *guard == next {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut *guard, next);
        let current = &*guard;
        let mut mutations = Vec::new();

        if !previous.main_container && current.main_container {
            mutations.push(Mutation::ChildList {
                added: 1,
                removed: 0,
            });
        }

        if current.rows.len() > previous.rows.len() {
            mutations.push(Mutation::ChildList {
                added: current.rows.len() - previous.rows.len(),
                removed: 0,
            });
        } else if previous.rows.len() > current.rows.len() {
            mutations.push(Mutation::ChildList {
                added: 0,
                removed: previous.rows.len() - current.rows.len(),
            });
        }

        let mut text_changed = previous.tabs != current.tabs || previous.url != current.url;
        for (old, new) in previous.rows.iter().zip(current.rows.iter()) {
            if old.row_classes != new.row_classes {
                mutations.push(Mutation::Attribute {
                    name: "class".to_string(),
                    row_state_target: old
                        .row_classes
                        .iter()
                        .any(|class| ROW_STATE_CLASSES.contains(&class.as_str())),
                });
            }
            if old.aria_label != new.aria_label {
                mutations.push(Mutation::Attribute {
                    name: "aria-label".to_string(),
                    row_state_target: false,
                });
            }
            if old.sender != new.sender
                || old.subject != new.subject
                || old.snippet != new.snippet
                || old.font_weight != new.font_weight
            {
                text_changed = true;
            }
        }
        if text_changed {
            mutations.push(Mutation::CharacterData);
        }
        mutations
    }

    fn row_matches(&self, index: usize, selector: Selector) -> bool {
        let Some(class) = selector.row_class() else {
            return false;
        };
        self.snapshot
            .read()
            .rows
            .get(index)
            .map(|row| row.row_classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }
}

impl HostPage for SnapshotHost {
    fn query(&self, selector: Selector) -> Option<ElementRef> {
        match selector {
            Selector::Body => Some(ElementRef(BODY)),
            Selector::MainInboxContainer => self
                .snapshot
                .read()
                .main_container
                .then_some(ElementRef(CONTAINER)),
            Selector::TabBadge(category) => self
                .snapshot
                .read()
                .tabs
                .get(category)
                .map(|_| badge_ref(category)),
            _ => self.query_all(selector).into_iter().next(),
        }
    }

    fn query_all(&self, selector: Selector) -> Vec<ElementRef> {
        match selector {
            Selector::Body => vec![ElementRef(BODY)],
            Selector::MainInboxContainer => {
                self.query(selector).into_iter().collect()
            }
            Selector::TabBadge(_) => self.query(selector).into_iter().collect(),
            Selector::EmailRow | Selector::UnreadRow | Selector::ReadRow => {
                let count = self.snapshot.read().rows.len();
                (0..count)
                    .filter(|index| self.row_matches(*index, selector))
                    .map(|index| row_ref(index, SLOT_ROW))
                    .collect()
            }
            Selector::Sender | Selector::Subject | Selector::Snippet => Vec::new(),
        }
    }

    fn query_within(&self, root: ElementRef, selector: Selector) -> Option<ElementRef> {
        let Some(Decoded::Row {
            index,
            slot: SLOT_ROW,
        }) = decode(root)
        else {
            return None;
        };
        let snapshot = self.snapshot.read();
        let row = snapshot.rows.get(index)?;
        match selector {
            Selector::Sender => row.sender.as_ref().map(|_| row_ref(index, SLOT_SENDER)),
            Selector::Subject => row.subject.as_ref().map(|_| row_ref(index, SLOT_SUBJECT)),
            Selector::Snippet => row.snippet.as_ref().map(|_| row_ref(index, SLOT_SNIPPET)),
            _ => None,
        }
    }

    fn text(&self, element: ElementRef) -> Option<String> {
        let snapshot = self.snapshot.read();
        match decode(element)? {
            Decoded::Badge(category) => snapshot.tabs.get(category).map(str::to_string),
            Decoded::Row { index, slot } => {
                let row = snapshot.rows.get(index)?;
                match slot {
                    SLOT_SENDER => row.sender.clone(),
                    SLOT_SUBJECT => row.subject.clone(),
                    SLOT_SNIPPET => row.snippet.clone(),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String> {
        let snapshot = self.snapshot.read();
        let Decoded::Row {
            index,
            slot: SLOT_ROW,
        } = decode(element)?
        else {
            return None;
        };
        let row = snapshot.rows.get(index)?;
        match name {
            "aria-label" => row.aria_label.clone(),
            "class" => Some(row.row_classes.join(" ")),
            _ => None,
        }
    }

    fn matches(&self, element: ElementRef, selector: Selector) -> bool {
        match decode(element) {
            Some(Decoded::Row {
                index,
                slot: SLOT_ROW,
            }) => self.row_matches(index, selector),
            Some(Decoded::Body) => selector == Selector::Body,
            Some(Decoded::Container) => selector == Selector::MainInboxContainer,
            Some(Decoded::Badge(category)) => selector == Selector::TabBadge(category),
            _ => false,
        }
    }

    fn computed_style(&self, element: ElementRef, property: &str) -> Option<String> {
        if property != "font-weight" {
            return None;
        }
        let Decoded::Row {
            index,
            slot: SLOT_ROW,
        } = decode(element)?
        else {
            return None;
        };
        self.snapshot.read().rows.get(index)?.font_weight.clone()
    }

    fn set_marker(&self, element: ElementRef, marker: &str, enabled: bool) {
        let mut markers = self.markers.write();
        let classes = markers.entry(element.0).or_default();
        if enabled {
            classes.insert(marker.to_string());
        } else {
            classes.remove(marker);
        }
    }

    fn has_marker(&self, element: ElementRef, marker: &str) -> bool {
        self.markers
            .read()
            .get(&element.0)
            .map(|classes| classes.contains(marker))
            .unwrap_or(false)
    }

    fn url(&self) -> Option<String> {
        let url = self.snapshot.read().url.clone();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }
}
