// Reply tracking: the bounded recency map and the edit/delete reconciliation
// built on it.

pub mod sync;
pub mod tracker;

pub use sync::{quote_body, EditOutcome, ReplySync};
pub use tracker::ReplyTracker;
