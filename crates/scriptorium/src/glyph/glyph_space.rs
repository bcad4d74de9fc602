//! # Glyph Candidate Space

use serde::{Deserialize, Serialize};

use crate::{glyph::GlyphChar, types::CharId};

/// The set of glyphs an LM character may be rendered as.
///
/// For an alphabet of ``V`` characters the space holds:
/// * ``V`` normal glyphs, one per template;
/// * ``V`` elision-tilde glyphs, if ``allow_elision_tilde``;
/// * one elided glyph, if ``allow_elision``.
///
/// The elided glyph is relative to the LM character: for ``lm_char`` it is
/// ``GlyphChar::elided(lm_char)``, and no other elided glyph is a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphSpace {
    /// Size of the character alphabet.
    pub num_chars: usize,

    /// Include the elided glyph.
    pub allow_elision: bool,

    /// Include tilde variants of every template.
    pub allow_elision_tilde: bool,
}

impl GlyphSpace {
    /// A space of plain templates only.
    pub fn new(num_chars: usize) -> Self {
        Self {
            num_chars,
            allow_elision: false,
            allow_elision_tilde: false,
        }
    }

    /// Set whether elided glyphs are members.
    pub fn with_elision(
        self,
        allow_elision: bool,
    ) -> Self {
        Self {
            allow_elision,
            ..self
        }
    }

    /// Set whether elision-tilde glyphs are members.
    pub fn with_elision_tilde(
        self,
        allow_elision_tilde: bool,
    ) -> Self {
        Self {
            allow_elision_tilde,
            ..self
        }
    }

    /// The number of candidate glyphs per LM character, ``G``.
    pub fn len(&self) -> usize {
        if self.num_chars == 0 {
            return 0;
        }
        let tildes = if self.allow_elision_tilde { self.num_chars } else { 0 };
        let elided = usize::from(self.allow_elision);
        self.num_chars + tildes + elided
    }

    /// Returns true if the space has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dense id of `glyph` as a candidate for `lm_char`.
    ///
    /// ## Returns
    /// `None` if the glyph is not a member of the space for `lm_char`.
    pub fn glyph_id(
        &self,
        lm_char: CharId,
        glyph: &GlyphChar,
    ) -> Option<usize> {
        let v = self.num_chars;
        if glyph.template_char_index >= v || lm_char >= v {
            return None;
        }
        match (glyph.is_elided, glyph.has_elision_tilde) {
            (false, false) => Some(glyph.template_char_index),
            (false, true) if self.allow_elision_tilde => Some(v + glyph.template_char_index),
            (true, false) if self.allow_elision && glyph.template_char_index == lm_char => {
                let tildes = if self.allow_elision_tilde { v } else { 0 };
                Some(v + tildes)
            }
            _ => None,
        }
    }

    /// Is `glyph` a candidate for `lm_char`?
    pub fn contains(
        &self,
        lm_char: CharId,
        glyph: &GlyphChar,
    ) -> bool {
        self.glyph_id(lm_char, glyph).is_some()
    }

    /// The candidates for `lm_char`, in glyph-id order.
    pub fn candidates(
        &self,
        lm_char: CharId,
    ) -> impl Iterator<Item = GlyphChar> + '_ {
        let v = if lm_char < self.num_chars { self.num_chars } else { 0 };
        let tildes = if self.allow_elision_tilde { v } else { 0 };
        let elided = self.allow_elision && v > 0;

        (0..v)
            .map(GlyphChar::normal)
            .chain((0..tildes).map(GlyphChar::with_tilde))
            .chain(elided.then(|| GlyphChar::elided(lm_char)))
    }
}
