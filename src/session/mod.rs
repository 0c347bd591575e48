// src/session/mod.rs

// Blocking driver: waits by sleeping the calling thread.
pub mod sync_session;

// Cooperative driver (feature-gated): waits by suspending the task.
#[cfg(feature = "async")]
pub mod async_session;

#[cfg(test)]
pub(crate) mod mock;

// --- Public Re-exports ---
pub use sync_session::SyncSession;

#[cfg(feature = "async")]
pub use async_session::AsyncSession;
