//! # External Collaborators
//!
//! The decoder scores transitions with two models it does not own:
//! a character [`LanguageModel`] and a visual [`EmissionModel`].
//! All scores are natural-log probabilities.

use core::ops::RangeInclusive;

use crate::{
    errors::SCResult,
    glyph::GlyphChar,
    lattice::GlyphStatistics,
    types::{CharId, LanguageId},
};

/// A character language model, optionally over several languages.
pub trait LanguageModel: Send + Sync {
    /// The n-gram order; the decoder keeps ``order - 1`` characters of context.
    fn order(&self) -> usize;

    /// The alphabet, in character-id order.
    fn alphabet(&self) -> Vec<String>;

    /// The language names, in language-id order; empty for a single
    /// unnamed language.
    fn languages(&self) -> Vec<String> {
        Vec::new()
    }

    /// ``ln P(lm_char | context, language)``.
    ///
    /// ## Arguments
    /// * `context` - up to ``order - 1`` previous characters, oldest first.
    /// * `lm_char` - the next character.
    /// * `language` - the language; `None` is the no-language sentinel.
    fn score_next(
        &self,
        context: &[CharId],
        lm_char: CharId,
        language: Option<LanguageId>,
    ) -> f64;

    /// ``ln P(to | from)`` for a language change; ``from`` is `None` at line start.
    fn language_switch_score(
        &self,
        from: Option<LanguageId>,
        to: Option<LanguageId>,
    ) -> f64 {
        let _ = (from, to);
        0.0
    }
}

/// The visual model: how well a glyph explains a span of pixel columns.
pub trait EmissionModel: Send + Sync {
    /// A preprocessed line image.
    type Line: Sync;

    /// The width of the line, in pixel columns.
    fn line_width(
        &self,
        line: &Self::Line,
    ) -> usize;

    /// The nominal width of a visible glyph.
    fn width_of(
        &self,
        glyph: &GlyphChar,
    ) -> usize;

    /// The widths the decoder tries for a visible glyph.
    fn width_range(
        &self,
        glyph: &GlyphChar,
    ) -> RangeInclusive<usize> {
        let width = self.width_of(glyph);
        width..=width
    }

    /// ``ln P(columns start..start + width | glyph)``.
    ///
    /// Never called for elided glyphs.
    fn emission_score(
        &self,
        line: &Self::Line,
        glyph: &GlyphChar,
        start: usize,
        width: usize,
    ) -> f64;

    /// Update the visual model from one EM iteration's glyph statistics.
    fn reestimate(
        &mut self,
        statistics: &GlyphStatistics,
    ) -> SCResult<()>;
}
