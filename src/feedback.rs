use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

/// A short, non-blocking notice for whatever UI is listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, message: message.into() }
    }
}

/// Publish/subscribe channel for toasts, handed explicitly to whoever needs it.
///
/// Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct FeedbackBus {
    tx: broadcast::Sender<Toast>,
}

impl FeedbackBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    /// Returns how many subscribers saw the toast. Nobody listening is fine.
    pub fn publish(&self, toast: Toast) -> usize {
        self.tx.send(toast).unwrap_or(0)
    }
}

impl Default for FeedbackBus {
    fn default() -> Self {
        Self::new(32)
    }
}
