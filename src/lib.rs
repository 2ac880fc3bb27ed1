//! Prefix-search autocomplete: a trie of cached suggestion lists in front of
//! a debounced, cancellable suggestion fetcher.

pub mod config;
pub mod debounce;
pub mod error;
pub mod feedback;
pub mod ranking;
pub mod session;
pub mod transport;
pub mod trie;

pub use config::SearchConfig;
pub use debounce::{DebouncedFetcher, Delivery, FetchEvent, FetchOutcome, RequestToken};
pub use error::{ConfigError, FetchError};
pub use feedback::{FeedbackBus, Toast, ToastLevel};
pub use session::AutocompleteSession;
pub use transport::{FetchRequest, HttpTransport, Transport};
pub use trie::{PrefixMatch, Trie};
