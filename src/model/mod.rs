//! Domain model types (pure).
//!
//! Attribute codes, entry identifiers, the logical line record and key
//! actions. Nothing in here knows about widths or viewports.

pub mod attr;
pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod line;

pub use attr::{AttrScanner, AttrState, TextStyle, Token};
pub use error::{AppError, EngineError, InputError};
pub use identifiers::EntryId;
pub use key_action::KeyAction;
pub use line::{LogicalLine, MarkRange};
