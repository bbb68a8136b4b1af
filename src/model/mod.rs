//! Document model.
//!
//! Pages and fragments as handed over by the rendering/extraction side. The
//! cleanup pass mutates this structure in place.

mod document;
mod page;

pub use document::*;
pub use page::*;
