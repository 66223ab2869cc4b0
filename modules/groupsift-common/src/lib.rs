pub mod cancel;
pub mod error;
pub mod progress;
pub mod types;

pub use cancel::CancelFlag;
pub use error::GroupSiftError;
pub use progress::{progress_channel, ProgressReceiver, ProgressSink, SentinelGuard};
pub use types::*;
