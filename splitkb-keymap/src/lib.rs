//! Shared keymap definitions and layer lookup for the split keyboard.
//!
//! This crate is `no_std`-compatible so it can be used by both the firmware
//! pipeline and the host CLI.

#![cfg_attr(not(test), no_std)]

mod code;
pub mod defaults;
mod keycode;
mod keymap;

pub use code::{mods, Code};
pub use keycode::Keycode;
pub use keymap::{Keymap, KeymapError};
