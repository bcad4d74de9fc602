//! # Glyphs
//!
//! A [`GlyphChar`] is what was printed for one language-model character.
//! [`GlyphSpace`] enumerates the glyphs a character may be printed as, and
//! [`GlyphTypeScheme`] collapses glyphs into the [`GlyphType`] categories
//! that condition the next substitution.

mod glyph_char;
mod glyph_space;
mod glyph_type;

pub use glyph_char::GlyphChar;
pub use glyph_space::GlyphSpace;
pub use glyph_type::{GlyphType, GlyphTypeScheme};
