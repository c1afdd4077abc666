//! Background refresh loop shared by the interactive surfaces.
//!
//! Fires once immediately, then on a fixed interval. Manual requests do not
//! reset the timer. Only one fetch runs at a time; requests and timer ticks
//! that fall due while it runs are coalesced into it.

use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::usage::{SharedSource, UsageSnapshot};

/// Default bound on a single fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a refresh ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Timer,
    Manual,
}

/// Message sent from the refresher to the surface
#[derive(Debug)]
pub enum RefreshEvent {
    /// A fetch began
    Started(RefreshTrigger),
    /// A fetch completed
    Finished(Result<UsageSnapshot, FetchError>),
}

/// Handle used by a surface to request a refresh.
///
/// Dropping every handle stops the refresher.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshTrigger>,
}

impl RefreshHandle {
    /// Request a manual refresh. Returns false when the request was dropped
    /// because one is already queued.
    pub fn request(&self) -> bool {
        self.tx.try_send(RefreshTrigger::Manual).is_ok()
    }
}

/// Polls a usage source on a timer and on request
pub struct Refresher {
    source: SharedSource,
    interval: Duration,
    timeout: Duration,
}

impl Refresher {
    pub fn new(source: SharedSource, interval: Duration) -> Self {
        Self {
            source,
            interval,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bound each fetch to `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start the loop in a background task
    pub fn start(self) -> (RefreshHandle, mpsc::Receiver<RefreshEvent>) {
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::channel(32);

        tokio::spawn(async move {
            self.run(trigger_rx, event_tx).await;
        });

        (RefreshHandle { tx: trigger_tx }, event_rx)
    }

    /// Fetch once, bounded by the timeout
    pub async fn fetch_once(&self) -> Result<UsageSnapshot, FetchError> {
        match tokio::time::timeout(self.timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    async fn run(
        self,
        mut triggers: mpsc::Receiver<RefreshTrigger>,
        events: mpsc::Sender<RefreshEvent>,
    ) {
        info!(
            "Refreshing from '{}' every {}s",
            self.source.name(),
            self.interval.as_secs()
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let trigger = tokio::select! {
                _ = ticker.tick() => RefreshTrigger::Timer,
                trigger = triggers.recv() => match trigger {
                    Some(trigger) => trigger,
                    None => break, // All handles dropped
                },
            };

            if events.send(RefreshEvent::Started(trigger)).await.is_err() {
                break; // Receiver dropped
            }

            debug!("Refresh started ({:?})", trigger);
            let result = self.fetch_once().await;
            if let Err(ref e) = result {
                warn!("Usage fetch failed: {}", e);
            }

            let mut coalesced = 0;
            while triggers.try_recv().is_ok() {
                coalesced += 1;
            }
            // With `Delay` the next tick is rescheduled one interval from now
            if ticker.tick().now_or_never().is_some() {
                coalesced += 1;
            }
            if coalesced > 0 {
                debug!("Coalesced {} refresh request(s) into the last fetch", coalesced);
            }

            if events.send(RefreshEvent::Finished(result)).await.is_err() {
                break;
            }
        }

        debug!("Refresher stopped");
    }
}
