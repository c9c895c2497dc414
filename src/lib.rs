//! chatscroll
//!
//! A bounded scrollback for chat text carrying mIRC-style attribute codes:
//! soft wrapping with word-wrap and two-column indent, visual-line
//! addressing, selection with minimal repaints, search and hit testing.
//! A ratatui front end shows it in a terminal.
//!
//! The engine lives in [`view_state`] and is pure; [`view`] and [`source`]
//! are the impure shell around it.

pub mod config;
pub mod logging;
pub mod model;
pub mod source;
pub mod view;
pub mod view_state;

// Glue between line sources and the scrollback
pub mod integration;

#[cfg(test)]
mod test_harness;
