#![deny(unsafe_op_in_unsafe_fn)]


pub mod builder;
pub mod config;
pub mod error;
pub mod raw; // OS-Level socket helpers (Linux/Windows)
pub mod stream;
pub mod transport;

/// Convenience re-exports
pub use builder::StreamBuilder;
pub use config::StreamConfig;
pub use error::SocketError;
pub use stream::{SocketMode, SocketStream};
pub use transport::Transport;
