// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod checksum;
pub mod config;
pub mod cycle;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod reading;
pub mod status;
pub mod synchronizer;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

pub use checksum::{checksum, verify_checksum};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use cycle::{CycleStep, ReadCycle};
pub use error::{ConfigError, InvalidFrame, TfmpError};
pub use frame::{RawFrame, FRAME_SIZE, HEADER, MAX_FRAME_SIZE};
pub use hal_traits::{TfmpClock, TfmpInstant, TfmpSerial};
pub use reading::{decode_frame, decode_frame_with, Reading, Sentinels};
pub use status::{Measurement, Status};
pub use synchronizer::{SyncState, Synchronizer};
