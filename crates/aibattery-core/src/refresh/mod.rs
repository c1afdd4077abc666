//! Refresh loop and the view state each surface renders from.

mod refresher;
mod view;

pub use refresher::{
    RefreshEvent, RefreshHandle, RefreshTrigger, Refresher, DEFAULT_FETCH_TIMEOUT,
};
pub use view::{RefreshPhase, UsageView};
