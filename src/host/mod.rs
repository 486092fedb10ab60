pub mod poller;
pub mod selectors;
pub mod snapshot;
pub mod unread;

pub use selectors::Selector;
pub use snapshot::{PageSnapshot, RowSnapshot, SnapshotHost};

/// One observed host mutation, reduced to the shape the watcher's relevance
/// filter cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Nodes were added to or removed from the watched subtree.
    ChildList { added: usize, removed: usize },
    /// An attribute changed; `row_state_target` is set when the target
    /// already carried a row-state class before the change.
    Attribute {
        name: String,
        row_state_target: bool,
    },
    /// Text content changed somewhere in the subtree.
    CharacterData,
}

/// Mutations delivered together by one observer callback.
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    pub mutations: Vec<Mutation>,
}

/// Opaque handle to one element on the host page. Only meaningful to the
/// host that issued it, and only until the next snapshot swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u64);

/// Capability surface the watcher consumes instead of a concrete DOM.
///
/// Implementations absorb lookup failures as `None` or empty results; none
/// of these operations can fail loudly.
pub trait HostPage: Send + Sync {
    /// First element matching the selector, if any.
    fn query(&self, selector: Selector) -> Option<ElementRef>;

    /// All elements matching the selector, in document order.
    fn query_all(&self, selector: Selector) -> Vec<ElementRef>;

    /// First matching descendant of `root`.
    fn query_within(&self, root: ElementRef, selector: Selector) -> Option<ElementRef>;

    /// Visible text content of an element.
    fn text(&self, element: ElementRef) -> Option<String>;

    /// Raw attribute value.
    fn attribute(&self, element: ElementRef, name: &str) -> Option<String>;

    /// Whether the element matches the selector.
    fn matches(&self, element: ElementRef, selector: Selector) -> bool;

    /// Computed style property, as the rendering engine reports it.
    fn computed_style(&self, element: ElementRef, property: &str) -> Option<String>;

    /// Add or remove a marker class on an element.
    fn set_marker(&self, element: ElementRef, marker: &str, enabled: bool);

    /// Whether a marker class is currently present on an element.
    fn has_marker(&self, element: ElementRef, marker: &str) -> bool;

    /// Location the page is currently showing.
    fn url(&self) -> Option<String>;
}
