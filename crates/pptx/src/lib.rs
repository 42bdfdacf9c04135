//! PPTX (Office Open XML) backend for slide decks.
//!
//! Reads slide text out of .pptx files, writes slide records back as
//! right-to-left presentations, rewrites run text in place, and restyles
//! existing presentations for right-to-left reading.

pub mod parser;
pub mod replace;
pub mod restyle;
mod template;
pub mod writer;

pub use parser::PptxParser;
pub use replace::{ReplaceReport, TextReplacer};
pub use restyle::{RestyleReport, Restyler};
pub use writer::PptxWriter;
