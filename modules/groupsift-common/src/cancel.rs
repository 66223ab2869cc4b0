use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the presentation layer and
/// the scrape worker. Settable from any thread; the worker checks it at the
/// top of every scroll round and every enrichment item, so cancellation
/// latency is bounded by roughly one round or one item — it never tears a
/// browser operation mid-flight.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request early termination of the current run.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Reset the flag. Called once at the start of a new run.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.request();
        assert!(other.is_cancelled());
        other.clear();
        assert!(!flag.is_cancelled());
    }
}
