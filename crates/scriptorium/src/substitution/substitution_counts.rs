//! # Substitution Contexts and Expected Counts

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    glyph::{GlyphChar, GlyphType},
    types::{CharId, CommonHashMap, LanguageId},
};

/// The conditioning context of one glyph substitution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SubstitutionContext {
    /// The language of the LM character; `None` is the no-language sentinel.
    pub language: Option<LanguageId>,

    /// The type of the previous glyph; [`GlyphType::Normal`] at line start.
    pub prev_glyph_type: GlyphType,

    /// The previous LM character; `None` at line start.
    pub prev_lm_char: Option<CharId>,

    /// The LM character being rendered.
    pub lm_char: CharId,
}

impl SubstitutionContext {
    /// Create a context.
    pub fn new(
        language: Option<LanguageId>,
        prev_glyph_type: GlyphType,
        prev_lm_char: Option<CharId>,
        lm_char: CharId,
    ) -> Self {
        Self {
            language,
            prev_glyph_type,
            prev_lm_char,
            lm_char,
        }
    }
}

/// Fractional expected counts ``(context, glyph) -> weight``.
///
/// Each decoded line fills its own accumulator; accumulators are combined
/// with [`SubstitutionCounts::merge`]. Per-context glyph counts are kept in
/// glyph order so that sums over a context are reproducible.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionCounts {
    counts: CommonHashMap<SubstitutionContext, BTreeMap<GlyphChar, f64>>,
}

impl SubstitutionCounts {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to the expected count of `glyph` in `context`.
    ///
    /// Weights that are not strictly positive are ignored.
    pub fn accumulate(
        &mut self,
        context: SubstitutionContext,
        glyph: GlyphChar,
        weight: f64,
    ) {
        if weight.is_nan() || weight <= 0.0 {
            return;
        }
        *self
            .counts
            .entry(context)
            .or_default()
            .entry(glyph)
            .or_insert(0.0) += weight;
    }

    /// Add all counts of `other` into `self`.
    pub fn merge(
        &mut self,
        other: &SubstitutionCounts,
    ) {
        for (context, glyphs) in &other.counts {
            let target = self.counts.entry(*context).or_default();
            for (glyph, weight) in glyphs {
                *target.entry(*glyph).or_insert(0.0) += weight;
            }
        }
    }

    /// The number of contexts with at least one count.
    pub fn num_contexts(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing was accumulated.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The expected count of `glyph` in `context`.
    pub fn get(
        &self,
        context: &SubstitutionContext,
        glyph: &GlyphChar,
    ) -> f64 {
        self.counts
            .get(context)
            .and_then(|glyphs| glyphs.get(glyph))
            .copied()
            .unwrap_or(0.0)
    }

    /// The glyph counts of one context, in glyph order.
    pub fn context_counts(
        &self,
        context: &SubstitutionContext,
    ) -> Option<&BTreeMap<GlyphChar, f64>> {
        self.counts.get(context)
    }

    /// The total weight across all contexts.
    pub fn total_weight(&self) -> f64 {
        self.sorted_contexts()
            .iter()
            .map(|(_, glyphs)| glyphs.values().sum::<f64>())
            .sum()
    }

    /// All contexts with their glyph counts, in context order.
    pub fn sorted_contexts(&self) -> Vec<(&SubstitutionContext, &BTreeMap<GlyphChar, f64>)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by_key(|(context, _)| **context);
        entries
    }

    /// Remove and return all counts.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}
