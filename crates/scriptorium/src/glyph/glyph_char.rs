//! # Glyph Descriptor

use serde::{Deserialize, Serialize};

use crate::types::CharId;

/// One rendered output unit.
///
/// The ordering is by template, then flags; it is used wherever glyphs are
/// iterated in a reproducible order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GlyphChar {
    /// The character whose visual template was rendered.
    ///
    /// For an elided glyph nothing is rendered; the index is the elided
    /// language-model character.
    pub template_char_index: CharId,

    /// The glyph consumes its language-model character but emits nothing.
    pub is_elided: bool,

    /// The glyph is rendered with a diacritic marking an elision.
    pub has_elision_tilde: bool,
}

impl GlyphChar {
    /// A plainly rendered template.
    pub fn normal(template_char_index: CharId) -> Self {
        Self {
            template_char_index,
            is_elided: false,
            has_elision_tilde: false,
        }
    }

    /// A template rendered with an elision tilde.
    pub fn with_tilde(template_char_index: CharId) -> Self {
        Self {
            template_char_index,
            is_elided: false,
            has_elision_tilde: true,
        }
    }

    /// The elision of `lm_char`.
    pub fn elided(lm_char: CharId) -> Self {
        Self {
            template_char_index: lm_char,
            is_elided: true,
            has_elision_tilde: false,
        }
    }

    /// Is this the unmodified rendering of `lm_char`?
    pub fn is_identity_of(
        &self,
        lm_char: CharId,
    ) -> bool {
        *self == Self::normal(lm_char)
    }

    /// Does this glyph occupy pixels?
    pub fn is_visible(&self) -> bool {
        !self.is_elided
    }
}
