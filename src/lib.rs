// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)] // no_std unless host transports are wanted

pub mod common;
pub mod session;

#[cfg(feature = "std")]
pub mod port;
#[cfg(feature = "std")]
pub mod reader;

// Re-export key types for convenience
pub use common::{decode_frame, Measurement, Reading, SessionConfig, Status, TfmpError};
pub use session::SyncSession;

#[cfg(feature = "async")]
pub use session::AsyncSession;
