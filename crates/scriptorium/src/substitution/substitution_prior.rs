//! # Hand-Specified Substitution Prior

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SCResult, ScriptoriumError},
    glyph::{GlyphChar, GlyphSpace},
    indexer::CharIndexer,
    types::CharId,
};

/// A pseudo-count for printing `glyph_symbol` where `lm_symbol` was meant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPseudoCount {
    /// The LM character symbol.
    pub lm_symbol: String,

    /// The symbol whose template is printed.
    pub glyph_symbol: String,

    /// The pseudo-count.
    pub count: f64,
}

/// Pseudo-counts added to every context on top of the smoothing count.
///
/// The default prior is uniform (no pseudo-counts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionPrior {
    /// Added to the identity glyph of every context.
    pub identity_pseudo_count: f64,

    /// Added to specific ``(lm, glyph template)`` pairs.
    pub pair_pseudo_counts: Vec<PairPseudoCount>,
}

impl SubstitutionPrior {
    /// The uniform prior.
    pub fn uniform() -> Self {
        Self::default()
    }

    /// A prior that favours printing each character as itself.
    pub fn identity_biased(identity_pseudo_count: f64) -> Self {
        Self {
            identity_pseudo_count,
            ..Self::default()
        }
    }

    /// Add a pair pseudo-count.
    pub fn with_pair(
        mut self,
        lm_symbol: impl Into<String>,
        glyph_symbol: impl Into<String>,
        count: f64,
    ) -> Self {
        self.pair_pseudo_counts.push(PairPseudoCount {
            lm_symbol: lm_symbol.into(),
            glyph_symbol: glyph_symbol.into(),
            count,
        });
        self
    }

    /// Resolve the prior against an alphabet and glyph space.
    ///
    /// ## Errors
    /// * [`ScriptoriumError::UnknownSymbol`] if a pair names a symbol not in `chars`.
    /// * [`ScriptoriumError::InvalidArgument`] for negative or non-finite counts.
    pub(crate) fn resolve(
        &self,
        chars: &CharIndexer,
        space: &GlyphSpace,
    ) -> SCResult<ResolvedPrior> {
        let check = |count: f64| {
            if count.is_finite() && count >= 0.0 {
                Ok(count)
            } else {
                Err(ScriptoriumError::invalid_argument(
                    "prior",
                    format!("pseudo-count {count} must be finite and >= 0"),
                ))
            }
        };

        let mut bonus: Vec<BTreeMap<GlyphChar, f64>> = vec![BTreeMap::new(); chars.len()];

        let identity = check(self.identity_pseudo_count)?;
        if identity > 0.0 {
            for (lm_char, slot) in bonus.iter_mut().enumerate() {
                slot.insert(GlyphChar::normal(lm_char), identity);
            }
        }

        for pair in &self.pair_pseudo_counts {
            let count = check(pair.count)?;
            let lm_char: CharId = chars.lookup(pair.lm_symbol.as_str())?;
            let glyph = GlyphChar::normal(chars.lookup(pair.glyph_symbol.as_str())?);
            if count > 0.0 && space.contains(lm_char, &glyph) {
                *bonus[lm_char].entry(glyph).or_insert(0.0) += count;
            }
        }

        Ok(ResolvedPrior { bonus })
    }
}

/// A [`SubstitutionPrior`] keyed by character ids.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedPrior {
    bonus: Vec<BTreeMap<GlyphChar, f64>>,
}

impl ResolvedPrior {
    /// The pseudo-count of `glyph` for `lm_char`.
    pub(crate) fn pseudo_count(
        &self,
        lm_char: CharId,
        glyph: &GlyphChar,
    ) -> f64 {
        self.bonus
            .get(lm_char)
            .and_then(|glyphs| glyphs.get(glyph))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars() -> CharIndexer {
        ["a", "b", "-"]
            .iter()
            .map(|s| s.to_string())
            .collect::<CharIndexer>()
            .frozen()
    }

    #[test]
    fn test_uniform() {
        let resolved = SubstitutionPrior::uniform()
            .resolve(&chars(), &GlyphSpace::new(3))
            .unwrap();
        assert_eq!(resolved.pseudo_count(0, &GlyphChar::normal(0)), 0.0);
    }

    #[test]
    fn test_identity_and_pairs() {
        let prior = SubstitutionPrior::identity_biased(2.0)
            .with_pair("a", "b", 0.5)
            .with_pair("a", "a", 1.0);
        let resolved = prior.resolve(&chars(), &GlyphSpace::new(3)).unwrap();

        assert_eq!(resolved.pseudo_count(0, &GlyphChar::normal(0)), 3.0);
        assert_eq!(resolved.pseudo_count(0, &GlyphChar::normal(1)), 0.5);
        assert_eq!(resolved.pseudo_count(1, &GlyphChar::normal(1)), 2.0);
        assert_eq!(resolved.pseudo_count(1, &GlyphChar::normal(0)), 0.0);
        assert_eq!(resolved.pseudo_count(9, &GlyphChar::normal(0)), 0.0);
    }

    #[test]
    fn test_unknown_symbol() {
        let prior = SubstitutionPrior::uniform().with_pair("a", "q", 1.0);
        assert!(matches!(
            prior.resolve(&chars(), &GlyphSpace::new(3)),
            Err(ScriptoriumError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_negative_count() {
        let prior = SubstitutionPrior::identity_biased(-1.0);
        assert!(matches!(
            prior.resolve(&chars(), &GlyphSpace::new(3)),
            Err(ScriptoriumError::InvalidArgument { arg: "prior", .. })
        ));
    }
}
