//! mangaclean-parse: lopdf backend and content stream interpreter.
//!
//! This crate owns everything that touches raw PDF objects: loading,
//! page tree queries with attribute inheritance, content stream
//! interpretation into glyph and image events, and the page mutations
//! the cleaner performs (link scrubbing, appending or replacing page
//! content, page removal). It depends on mangaclean-core for shared
//! data types.

pub mod char_extraction;
pub mod cmap;
pub mod error;
pub mod font_metrics;
pub mod handler;
pub mod interpreter;
pub mod lopdf_backend;
pub mod standard_fonts;
pub mod text_state;

pub use char_extraction::glyph_from_event;
pub use error::BackendError;
pub use handler::{CharEvent, ContentHandler, FillEvent, ImageEvent};
pub use interpreter::{InterpretOptions, interpret_content};
pub use lopdf_backend::{LopdfDocument, XObjectImage};
pub use mangaclean_core;

/// Re-exported so callers can build content operations without a direct
/// lopdf dependency.
pub use lopdf::content::Operation;
pub use lopdf::{Object, ObjectId};
