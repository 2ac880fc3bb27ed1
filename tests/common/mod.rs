use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sokusuggest::{DebouncedFetcher, FetchError, FetchRequest, Transport};
use tokio::time::{sleep, Instant};

pub type Seen = Arc<Mutex<Vec<(String, Vec<String>)>>>;

#[derive(Default)]
struct State {
    calls: Vec<(String, Duration)>,
    responses: HashMap<String, Result<Vec<String>, FetchError>>,
    latency: HashMap<String, Duration>,
}

/// Answers queries from a table after a per-query latency.
///
/// The request url is the bare query, see [`fetcher`].
#[derive(Clone)]
pub struct MockTransport {
    start: Instant,
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            state: Arc::default(),
        }
    }

    pub fn respond(self, query: &str, results: &[&str]) -> Self {
        let results = results.iter().map(|s| s.to_string()).collect();
        self.state.lock().unwrap().responses.insert(query.into(), Ok(results));
        self
    }

    pub fn fail(self, query: &str, error: FetchError) -> Self {
        self.state.lock().unwrap().responses.insert(query.into(), Err(error));
        self
    }

    pub fn latency(self, query: &str, ms: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .latency
            .insert(query.into(), Duration::from_millis(ms));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn calls(&self) -> Vec<(String, u64)> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(q, at)| (q.clone(), at.as_millis() as u64))
            .collect()
    }
}

impl Transport for MockTransport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<Vec<String>, FetchError>> + Send {
        let state = Arc::clone(&self.state);
        let elapsed = self.start.elapsed();
        async move {
            let (latency, response) = {
                let mut s = state.lock().unwrap();
                s.calls.push((request.url.clone(), elapsed));
                (
                    s.latency
                        .get(&request.url)
                        .copied()
                        .unwrap_or(Duration::from_millis(20)),
                    s.responses.get(&request.url).cloned().unwrap_or(Ok(Vec::new())),
                )
            };
            sleep(latency).await;
            response
        }
    }
}

pub fn fetcher(transport: &MockTransport, delay_ms: u64) -> DebouncedFetcher<MockTransport> {
    DebouncedFetcher::new(
        Arc::new(transport.clone()),
        |query: &str| {
            Ok(FetchRequest {
                url: query.to_string(),
                no_cache: false,
            })
        },
        Duration::from_millis(delay_ms),
    )
}

/// A results callback that records every call.
pub fn recorder() -> (Seen, impl FnMut(&str, &[String])) {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    let callback = move |query: &str, results: &[String]| {
        sink.lock().unwrap().push((query.to_string(), results.to_vec()));
    };
    (seen, callback)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
