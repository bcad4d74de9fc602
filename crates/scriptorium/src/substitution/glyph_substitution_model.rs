//! # Glyph Substitution Model Trait

use crate::{
    glyph::{GlyphChar, GlyphSpace, GlyphType, GlyphTypeScheme},
    indexer::{CharIndexer, LanguageIndexer, charset},
    types::{CharId, LanguageId},
};

/// ``P(glyph | language, prev_glyph_type, prev_lm_char, lm_char)``.
///
/// Implementations are read concurrently by every line decoded in an E-step.
pub trait GlyphSubstitutionModel: Send + Sync {
    /// The language names.
    fn language_indexer(&self) -> &LanguageIndexer;

    /// The LM alphabet.
    fn character_indexer(&self) -> &CharIndexer;

    /// The candidate glyphs of every LM character.
    fn glyph_space(&self) -> GlyphSpace;

    /// The conditioning scheme for the previous glyph.
    fn glyph_type_scheme(&self) -> GlyphTypeScheme;

    /// When false, only the identity glyph has non-zero probability.
    fn allows_glyph_substitution(&self) -> bool;

    /// The probability of printing `glyph` for `lm_char`.
    ///
    /// ## Arguments
    /// * `language` - the language; `None` is the no-language sentinel.
    /// * `prev_glyph_type` - the previous glyph's type; [`GlyphType::Normal`] at line start.
    /// * `prev_lm_char` - the previous LM character; `None` at line start.
    /// * `lm_char` - the LM character.
    /// * `glyph` - the glyph.
    ///
    /// ## Returns
    /// A probability in ``[0, 1]``; zero for glyphs outside the glyph space.
    fn glyph_prob(
        &self,
        language: Option<LanguageId>,
        prev_glyph_type: GlyphType,
        prev_lm_char: Option<CharId>,
        lm_char: CharId,
        glyph: &GlyphChar,
    ) -> f64;

    /// The id of the canonical hyphen, if the alphabet has one.
    fn hyphen_char(&self) -> Option<CharId> {
        self.character_indexer().get_index(charset::HYPHEN)
    }

    /// The conditioning type of `glyph` under this model's scheme.
    fn glyph_type_of(
        &self,
        glyph: &GlyphChar,
    ) -> GlyphType {
        self.glyph_type_scheme().classify(glyph, self.hyphen_char())
    }
}
