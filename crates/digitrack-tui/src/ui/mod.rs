//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, gated by the auth guard
//! - `input`: Keyboard event handling
//! - `styles`: Color scheme and text styling
//! - `widgets`: The shared form widget and layout helpers
//! - `tabs`: Tab-specific content rendering

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
pub mod widgets;
