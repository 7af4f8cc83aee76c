//! EPUB package assembly.
//!
//! Turns a segmented document into a complete EPUB container held in memory:
//! package document, navigation resources, stylesheet, chapter documents,
//! and the optional cover image.

mod css;
mod writer;

pub use css::BOOK_CSS;
pub use writer::assemble;
