//! One-directional progress conduit from the scrape worker to whatever is
//! watching it. Unbounded FIFO; `None` is the terminal sentinel and is sent
//! exactly once per run, on every outcome including panics.

use std::sync::mpsc::{self, Receiver, Sender};

pub type ProgressReceiver = Receiver<Option<String>>;

/// Producer half of the progress channel.
#[derive(Clone)]
pub struct ProgressSink {
    tx: Sender<Option<String>>,
}

impl ProgressSink {
    /// Push a human-readable progress line. Send failures mean the consumer
    /// went away, which is not the worker's problem — the line is dropped.
    pub fn line(&self, msg: impl Into<String>) {
        let _ = self.tx.send(Some(msg.into()));
    }

    /// Arm the sentinel for this run. Must be created before the run body so
    /// the sentinel fires even if the body panics.
    pub fn sentinel_guard(&self) -> SentinelGuard {
        SentinelGuard {
            tx: self.tx.clone(),
        }
    }
}

/// Sends the `None` sentinel on drop. Drop-based delivery is the
/// `finally`-equivalent: the consumer can always terminate its poll loop,
/// whether the run succeeded, failed, or was cancelled.
pub struct SentinelGuard {
    tx: Sender<Option<String>>,
}

impl Drop for SentinelGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(None);
    }
}

/// Create an unbounded progress channel.
pub fn progress_channel() -> (ProgressSink, ProgressReceiver) {
    let (tx, rx) = mpsc::channel();
    (ProgressSink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn lines_arrive_in_order_then_sentinel() {
        let (sink, rx) = progress_channel();
        {
            let _guard = sink.sentinel_guard();
            sink.line("one");
            sink.line("two");
        }
        assert_eq!(rx.recv().unwrap(), Some("one".to_string()));
        assert_eq!(rx.recv().unwrap(), Some("two".to_string()));
        assert_eq!(rx.recv().unwrap(), None);
    }

    #[test]
    fn sentinel_fires_on_panic() {
        let (sink, rx) = progress_channel();
        let handle = std::thread::spawn(move || {
            let _guard = sink.sentinel_guard();
            panic!("worker blew up");
        });
        assert!(handle.join().is_err());
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), None);
    }

    #[test]
    fn exactly_one_sentinel_per_guard() {
        let (sink, rx) = progress_channel();
        drop(sink.sentinel_guard());
        drop(sink);
        assert_eq!(rx.recv().unwrap(), None);
        assert!(rx.recv().is_err()); // channel closed, no second sentinel
    }
}
