use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::transport::{FetchRequest, Transport};

pub type RequestBuilder = Box<dyn Fn(&str) -> Result<FetchRequest, FetchError> + Send>;

/// Cooperative cancellation handle shared between the fetcher and one request task.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl RequestToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Posted by timer and request tasks back to the owning fetcher.
#[derive(Debug)]
pub enum FetchEvent {
    TimerElapsed {
        timer: u64,
        query: String,
    },
    Completed {
        token: u64,
        query: String,
        outcome: Result<Vec<String>, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub query: String,
    pub results: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Delivered(Delivery),
    Failed { query: String, error: FetchError },
}

struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

struct ActiveRequest {
    token: RequestToken,
    handle: JoinHandle<()>,
}

/// Turns bursts of queries into a single trailing (or leading) request.
///
/// Timers and requests run as tokio tasks and report back through
/// [`FetchEvent`]s; all state changes happen in [`handle_event`] on the
/// owner's task. Must be driven from within a tokio runtime.
///
/// [`handle_event`]: DebouncedFetcher::handle_event
pub struct DebouncedFetcher<T: Transport> {
    transport: Arc<T>,
    build_request: RequestBuilder,
    delay: Duration,
    leading: bool,
    has_fired_leading: bool,
    next_id: u64,
    pending_timer: Option<PendingTimer>,
    active: Option<ActiveRequest>,
    events_tx: mpsc::Sender<FetchEvent>,
    events_rx: mpsc::Receiver<FetchEvent>,
}

impl<T: Transport> DebouncedFetcher<T> {
    pub fn new<B>(transport: Arc<T>, build_request: B, delay: Duration) -> Self
    where
        B: Fn(&str) -> Result<FetchRequest, FetchError> + Send + 'static,
    {
        let (events_tx, events_rx) = mpsc::channel(16);
        Self {
            transport,
            build_request: Box::new(build_request),
            delay,
            leading: false,
            has_fired_leading: false,
            next_id: 0,
            pending_timer: None,
            active: None,
            events_tx,
            events_rx,
        }
    }

    /// Fire on the first call of a quiet window instead of after it.
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True from dispatch until the current request resolves or is dropped.
    pub fn in_flight(&self) -> bool {
        self.active.is_some()
    }

    /// No timer pending and nothing in flight.
    pub fn is_idle(&self) -> bool {
        self.pending_timer.is_none() && self.active.is_none()
    }

    pub fn run(&mut self, query: &str) {
        // 1. A newer call always resets the quiet window
        if let Some(timer) = self.pending_timer.take() {
            timer.handle.abort();
        }

        // 2. Leading edge
        if self.leading && !self.has_fired_leading {
            self.issue(query);
            self.has_fired_leading = true;
        }

        // 3. Trailing edge
        let id = self.next_id();
        let tx = self.events_tx.clone();
        let delay = self.delay;
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(FetchEvent::TimerElapsed { timer: id, query }).await;
        });
        self.pending_timer = Some(PendingTimer { id, handle });
    }

    /// Waits for the next timer or request event.
    pub async fn next_event(&mut self) -> FetchEvent {
        match self.events_rx.recv().await {
            Some(event) => event,
            // The fetcher keeps a sender alive, so this never resolves.
            None => std::future::pending().await,
        }
    }

    /// Applies an event; returns what the owner should act on, if anything.
    ///
    /// Stale timers and superseded requests yield `None`.
    pub fn handle_event(&mut self, event: FetchEvent) -> Option<FetchOutcome> {
        match event {
            FetchEvent::TimerElapsed { timer, query } => {
                if !matches!(&self.pending_timer, Some(pending) if pending.id == timer) {
                    debug!("ignoring stale timer {timer}");
                    return None;
                }
                self.pending_timer = None;
                if !self.leading {
                    self.issue(&query);
                }
                self.has_fired_leading = false;
                None
            }
            FetchEvent::Completed { token, query, outcome } => {
                let current = matches!(
                    &self.active,
                    Some(active) if active.token.id() == token && !active.token.is_cancelled()
                );
                if !current {
                    debug!("discarding result of superseded request {token} for {query:?}");
                    return None;
                }
                self.active = None;

                match outcome {
                    Ok(results) => {
                        debug!("request {token} for {query:?} returned {} candidates", results.len());
                        Some(FetchOutcome::Delivered(Delivery { query, results }))
                    }
                    Err(FetchError::Cancelled) => None,
                    Err(FetchError::Malformed(reason)) => {
                        warn!("malformed response for {query:?}, treating as no results: {reason}");
                        Some(FetchOutcome::Delivered(Delivery {
                            query,
                            results: Vec::new(),
                        }))
                    }
                    Err(error) => {
                        error!("fetch for {query:?} failed: {error}");
                        Some(FetchOutcome::Failed { query, error })
                    }
                }
            }
        }
    }

    /// Drops the pending timer and aborts the active request.
    pub fn disconnect(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            timer.handle.abort();
        }
        self.cancel_active();
        self.has_fired_leading = false;
    }

    fn issue(&mut self, query: &str) {
        self.cancel_active();

        let token = RequestToken::new(self.next_id());
        let request = (self.build_request)(query);
        let transport = Arc::clone(&self.transport);
        let tx = self.events_tx.clone();
        let task_token = token.clone();
        let query = query.to_string();

        debug!("dispatching request {} for {query:?}", token.id());
        let handle = tokio::spawn(async move {
            let outcome = match request {
                Ok(request) => transport.fetch(request).await,
                Err(e) => Err(e),
            };
            let outcome = if task_token.is_cancelled() {
                Err(FetchError::Cancelled)
            } else {
                outcome
            };
            let _ = tx
                .send(FetchEvent::Completed {
                    token: task_token.id(),
                    query,
                    outcome,
                })
                .await;
        });
        self.active = Some(ActiveRequest { token, handle });
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("cancelling request {}", active.token.id());
            active.token.cancel();
            active.handle.abort();
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl<T: Transport> Drop for DebouncedFetcher<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
