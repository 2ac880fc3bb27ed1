use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;

use crate::config::SearchConfig;
use crate::debounce::{Delivery, DebouncedFetcher, FetchOutcome};
use crate::feedback::{FeedbackBus, Toast};
use crate::ranking;
use crate::transport::{opensearch_request, Transport};
use crate::trie::Trie;

/// Autocomplete over a search box: answers from the trie when it can and
/// refreshes it through a [`DebouncedFetcher`] when it can't.
///
/// `on_results(query, ranked)` is called every time a new list is exposed,
/// both for cached answers and for fresh deliveries.
pub struct AutocompleteSession<T, F>
where
    T: Transport,
    F: FnMut(&str, &[String]),
{
    trie: Trie<String>,
    fetcher: DebouncedFetcher<T>,
    on_results: F,
    results: Vec<String>,
    refresh_failed: bool,
    feedback: Option<FeedbackBus>,
}

impl<T, F> AutocompleteSession<T, F>
where
    T: Transport,
    F: FnMut(&str, &[String]),
{
    pub fn new(fetcher: DebouncedFetcher<T>, on_results: F) -> Self {
        Self {
            trie: Trie::new(),
            fetcher,
            on_results,
            results: Vec::new(),
            refresh_failed: false,
            feedback: None,
        }
    }

    /// Session against an opensearch endpoint described by `config`.
    pub fn from_config(config: &SearchConfig, transport: Arc<T>, on_results: F) -> Self {
        let endpoint = config.endpoint.clone();
        let no_cache = config.no_cache;
        let fetcher = DebouncedFetcher::new(
            transport,
            move |query: &str| opensearch_request(&endpoint, query, no_cache),
            config.delay,
        )
        .leading(config.leading);
        Self::new(fetcher, on_results)
    }

    /// Failed refreshes are announced on `bus` as warnings.
    pub fn with_feedback(mut self, bus: FeedbackBus) -> Self {
        self.feedback = Some(bus);
        self
    }

    pub fn submit(&mut self, query: &str) {
        // While the network is busy, trust it to catch up with the latest query.
        if self.fetcher.in_flight() {
            debug!("search in flight, rescheduling for {query:?}");
            self.fetcher.run(query);
            return;
        }

        let found = self.trie.longest_prefix_lookup(query);
        let exact_match = found.exact_match;
        let ranked = ranking::rank_results(query, found.results);
        self.expose(query, ranked);

        if exact_match {
            debug!("cache hit for {query:?}");
        } else {
            debug!("cache miss for {query:?}, searching");
            self.fetcher.run(query);
        }
    }

    /// Records a completed search and exposes it when it found anything.
    ///
    /// An empty list is still recorded so the query counts as searched.
    pub fn on_fetch_result(&mut self, query: &str, raw_results: Vec<String>) {
        if raw_results.is_empty() {
            self.trie.insert(query, raw_results);
            return;
        }
        let ranked = ranking::rank_results(query, &raw_results);
        self.trie.insert(query, raw_results);
        self.expose(query, ranked);
    }

    /// Waits for one timer or network event and applies it.
    pub async fn process_next_event(&mut self) {
        let event = self.fetcher.next_event().await;
        if let Some(outcome) = self.fetcher.handle_event(event) {
            self.apply(outcome);
        }
    }

    /// Processes events until no timer is pending and nothing is in flight.
    pub async fn settle(&mut self) {
        while !self.fetcher.is_idle() {
            self.process_next_event().await;
        }
    }

    /// Feeds queries from `queries` into the session until the sender closes.
    ///
    /// Work still pending when the input closes is left to the caller; drop
    /// the session or call [`disconnect`](Self::disconnect) to abandon it.
    pub async fn run(&mut self, mut queries: mpsc::Receiver<String>) {
        loop {
            tokio::select! {
                query = queries.recv() => match query {
                    Some(query) => self.submit(&query),
                    None => break,
                },
                event = self.fetcher.next_event() => {
                    if let Some(outcome) = self.fetcher.handle_event(event) {
                        self.apply(outcome);
                    }
                }
            }
        }
    }

    /// Cancels the pending timer and any request in flight.
    pub fn disconnect(&mut self) {
        info!("autocomplete session disconnected");
        self.fetcher.disconnect();
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn in_flight(&self) -> bool {
        self.fetcher.in_flight()
    }

    /// True after a failed refresh, until the next successful one.
    pub fn refresh_failed(&self) -> bool {
        self.refresh_failed
    }

    pub fn trie(&self) -> &Trie<String> {
        &self.trie
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Delivered(Delivery { query, results }) => {
                self.refresh_failed = false;
                self.on_fetch_result(&query, results);
            }
            FetchOutcome::Failed { query, error } => {
                self.refresh_failed = true;
                if let Some(bus) = &self.feedback {
                    bus.publish(Toast::warning(format!(
                        "Live suggestions for \"{query}\" failed: {error}"
                    )));
                }
            }
        }
    }

    fn expose(&mut self, query: &str, ranked: Vec<String>) {
        self.results = ranked;
        (self.on_results)(query, &self.results);
    }
}
