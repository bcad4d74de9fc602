//! # Transcription Output
//!
//! Turns decoded lines into text: visible glyphs, the underlying LM
//! characters, and a form that marks every substitution.

mod transcription;

pub use transcription::{TranscribedLine, consolidate_lines};
