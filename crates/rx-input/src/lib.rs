//! Input handling for retrox
//!
//! Inputs injected by the front-end (on-screen buttons, shortcuts) are
//! forwarded to the active core as libretro joypad events.

pub mod joypad;

pub use joypad::{InjectedInput, JoypadButtons, JoypadState, PlayerSlot};
