//! View-state layer - wrapping, addressing, selection and painting
//!
//! This module implements the scrollback engine. Everything here is pure and
//! synchronous; the only outside capabilities are a [`WidthMeasurer`] and a
//! [`PaintSink`] supplied by the front end.
//!
//! # Module Structure
//!
//! - `measure`: WidthMeasurer capability and the cell-based default
//! - `reflow`: soft-wrap computation with a bounded per-line wrap cache
//! - `store`: LineStore - bounded, head-evicting sequence of logical lines
//! - `viewport`: ViewportIndex - visual line to (entry, sub-line) with page-top cache
//! - `selection`: SelectionModel - marks and minimal repaint requests
//! - `search`: forward case-insensitive search
//! - `renderer`: style-run painting through a PaintSink
//! - `hit_test`: pointer position to byte offset and word
//! - `options`: ScrollbackOptions
//! - `scrollback`: Scrollback - owner that keeps all of the above consistent

pub mod measure;
pub mod options;
pub mod reflow;
pub mod renderer;
pub mod scrollback;
pub mod search;
pub mod selection;
pub mod store;
pub mod viewport;

pub use hit_test::{Hit, Word};
pub use measure::{CellMeasurer, WidthMeasurer};
pub use options::ScrollbackOptions;
pub use renderer::{PaintSink, Renderer};
pub use scrollback::Scrollback;
pub use search::SearchHit;
pub use selection::{RenderRequest, SelectionModel, SelectionRange, TextPosition};
pub use store::{AppendOutcome, EvictedEntry, LineStore};
pub use viewport::{Location, PageTop, ViewportIndex};
