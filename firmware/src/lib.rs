//! Input pipeline for a split wireless keyboard.
//!
//! The *source* half owns the host connection: it scans its own matrix,
//! merges in the transitions the *sink* half forwards over the peer link,
//! resolves layers and hands 8-byte HID reports to the host. The sink only
//! scans and forwards.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod debounce;
pub mod error;
pub mod hid;
pub mod keyboard;
pub mod keys;
pub mod link;
pub mod matrix;
pub mod sched;
pub mod translate;

pub use config::{DebounceConfig, KeySource, KeyboardConfig, Role};
pub use error::{ConfigError, DecodeError, Fault, LinkError};
pub use hid::{build_report, HostLeds, HostLink, KeyboardReport, ProtocolMode};
pub use keyboard::Keyboard;
pub use keys::{ActiveKey, KeyEvent, KeyTracker};
pub use link::{NoPeer, PeerLink, SyncMessage};
pub use matrix::{GpioMatrix, MatrixPins, ScanSummary, Scanner, SimMatrix};
pub use sched::{Task, TaskQueue};
pub use translate::translate;
