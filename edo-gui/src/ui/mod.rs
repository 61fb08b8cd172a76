//! # UI Module
//!
//! This module contains the screen layout and panels of the EDO keyboard application.

pub mod main_display;
pub mod settings_panel;
