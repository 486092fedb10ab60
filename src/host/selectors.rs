use crate::domain::Category;

/// Logical selector names for everything the watcher needs to find on the
/// host page. Real-DOM hosts resolve these through [`Selector::css`]; the
/// snapshot host interprets the logical name directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Body,
    MainInboxContainer,
    EmailRow,
    UnreadRow,
    ReadRow,
    Sender,
    Subject,
    Snippet,
    TabBadge(Category),
}

impl Selector {
    /// Concrete CSS for the Gmail markup this was built against.
    pub fn css(self) -> &'static str {
        match self {
            Selector::Body => "body",
            Selector::MainInboxContainer => ".nH.bkK",
            Selector::EmailRow => "tr.zA",
            Selector::UnreadRow => "tr.zE",
            Selector::ReadRow => "tr.yO",
            Selector::Sender => ".yW",
            Selector::Subject => ".y6",
            Selector::Snippet => ".y2",
            Selector::TabBadge(Category::Primary) => r#"[role="tab"][aria-label="Primary"] .bsU"#,
            Selector::TabBadge(Category::Social) => r#"[role="tab"][aria-label="Social"] .bsU"#,
            Selector::TabBadge(Category::Promotions) => {
                r#"[role="tab"][aria-label="Promotions"] .bsU"#
            }
            Selector::TabBadge(Category::Updates) => r#"[role="tab"][aria-label="Updates"] .bsU"#,
            Selector::TabBadge(Category::Forums) => r#"[role="tab"][aria-label="Forums"] .bsU"#,
        }
    }

    /// The row-state class a row selector corresponds to, if any. Mutation
    /// producers use this to tag class changes on row elements.
    pub fn row_class(self) -> Option<&'static str> {
        match self {
            Selector::EmailRow => Some("zA"),
            Selector::UnreadRow => Some("zE"),
            Selector::ReadRow => Some("yO"),
            _ => None,
        }
    }
}

/// Classes that flag an element as a message row in some read state.
pub const ROW_STATE_CLASSES: [&str; 3] = ["zA", "zE", "yO"];
