pub mod bus;
pub mod messages;
pub mod popup;

pub use bus::{CountsQuery, RuntimeBus};
pub use messages::{InboundMessage, OutboundMessage};
