//! Per-surface view state: `Loading -> {Ready, Error}`, re-entered on refresh.

use chrono::{DateTime, Utc};

use super::refresher::RefreshEvent;
use crate::error::FetchError;
use crate::usage::UsageSnapshot;

/// Phase of the refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    /// A fetch is in progress (or none has completed yet)
    #[default]
    Loading,
    /// Latest fetch succeeded
    Ready,
    /// Latest fetch failed
    Error,
}

/// What a surface renders from
#[derive(Debug, Clone, Default)]
pub struct UsageView {
    pub phase: RefreshPhase,
    /// Latest good snapshot; cleared when a fetch fails
    pub snapshot: Option<UsageSnapshot>,
    /// Message of the latest failure
    pub error: Option<String>,
    /// When the latest successful fetch completed
    pub last_refresh: Option<DateTime<Utc>>,
}

impl UsageView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Loading`. The previous snapshot stays until the fetch resolves.
    pub fn begin(&mut self) {
        self.phase = RefreshPhase::Loading;
    }

    /// Resolve the current fetch
    pub fn finish(&mut self, result: Result<UsageSnapshot, FetchError>, now: DateTime<Utc>) {
        match result {
            Ok(snapshot) => {
                self.phase = RefreshPhase::Ready;
                self.snapshot = Some(snapshot);
                self.error = None;
                self.last_refresh = Some(now);
            }
            Err(e) => {
                self.phase = RefreshPhase::Error;
                self.snapshot = None;
                self.error = Some(e.to_string());
            }
        }
    }

    /// Apply an event from the refresher
    pub fn apply(&mut self, event: RefreshEvent, now: DateTime<Utc>) {
        match event {
            RefreshEvent::Started(_) => self.begin(),
            RefreshEvent::Finished(result) => self.finish(result, now),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == RefreshPhase::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::RefreshTrigger;
    use crate::usage::MockSource;

    #[test]
    fn test_starts_loading() {
        let view = UsageView::new();
        assert!(view.is_loading());
        assert!(view.snapshot.is_none());
        assert!(view.last_refresh.is_none());
    }

    #[test]
    fn test_ready_then_error_discards_snapshot() {
        let now = Utc::now();
        let mut view = UsageView::new();

        view.apply(RefreshEvent::Started(RefreshTrigger::Timer), now);
        view.apply(RefreshEvent::Finished(Ok(MockSource::snapshot())), now);
        assert_eq!(view.phase, RefreshPhase::Ready);
        assert!(view.snapshot.is_some());
        assert_eq!(view.last_refresh, Some(now));

        view.apply(RefreshEvent::Started(RefreshTrigger::Manual), now);
        assert!(view.is_loading());
        assert!(view.snapshot.is_some());

        view.apply(RefreshEvent::Finished(Err(FetchError::NoMeters)), now);
        assert_eq!(view.phase, RefreshPhase::Error);
        assert!(view.snapshot.is_none());
        assert_eq!(
            view.error.as_deref(),
            Some("no usage meters found in output")
        );
        // Last successful refresh time is kept
        assert_eq!(view.last_refresh, Some(now));
    }

    #[test]
    fn test_error_kept_until_next_success() {
        let now = Utc::now();
        let mut view = UsageView::new();
        view.finish(Err(FetchError::NoMeters), now);
        view.begin();
        assert!(view.error.is_some());
        view.finish(Ok(MockSource::snapshot()), now);
        assert_eq!(view.phase, RefreshPhase::Ready);
        assert!(view.error.is_none());
    }
}
