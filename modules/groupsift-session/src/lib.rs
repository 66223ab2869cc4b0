pub mod cookies;
pub mod error;
pub mod login;
pub mod navigate;
pub mod session;

pub use error::{Result, SessionError};
pub use session::Session;
