//! # Widgets Module
//!
//! Custom canvas widgets.

pub mod edo_keyboard;
