//! # Expected Statistics of Decoded Lines

use std::collections::BTreeMap;

use crate::{
    glyph::{GlyphChar, GlyphType},
    lattice::{LineDecode, LineId},
    substitution::{GlyphSubstitutionModel, SubstitutionContext, SubstitutionCounts},
    types::CharId,
};

/// A weighted claim that `glyph` occupies a span of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphObservation {
    /// The line.
    pub line: LineId,

    /// The visible glyph.
    pub glyph: GlyphChar,

    /// The first pixel column.
    pub start: usize,

    /// The width in pixel columns.
    pub width: usize,

    /// The posterior weight.
    pub weight: f64,
}

/// Glyph statistics handed to [`crate::EmissionModel::reestimate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphStatistics {
    /// Expected counts of each ``(glyph, width)``.
    pub width_counts: BTreeMap<(GlyphChar, usize), f64>,

    /// Weighted glyph placements, in line order.
    pub observations: Vec<GlyphObservation>,
}

impl GlyphStatistics {
    /// Record a visible glyph placement.
    ///
    /// Elided glyphs and non-positive weights are ignored; placements
    /// lighter than `min_observation_weight` only update the width counts.
    pub fn record(
        &mut self,
        line: LineId,
        glyph: GlyphChar,
        start: usize,
        width: usize,
        weight: f64,
        min_observation_weight: f64,
    ) {
        if glyph.is_elided || weight.is_nan() || weight <= 0.0 {
            return;
        }
        *self.width_counts.entry((glyph, width)).or_insert(0.0) += weight;
        if weight >= min_observation_weight {
            self.observations.push(GlyphObservation {
                line,
                glyph,
                start,
                width,
                weight,
            });
        }
    }

    /// Append `other`.
    pub fn merge(
        &mut self,
        other: GlyphStatistics,
    ) {
        for (key, weight) in other.width_counts {
            *self.width_counts.entry(key).or_insert(0.0) += weight;
        }
        self.observations.extend(other.observations);
    }

    /// The total expected count of visible glyphs.
    pub fn total_weight(&self) -> f64 {
        self.width_counts.values().sum()
    }
}

/// Everything one E-step learns from one line.
#[derive(Debug, Clone, Default)]
pub struct LineStatistics {
    /// Expected substitution counts.
    pub substitution: SubstitutionCounts,

    /// Expected glyph placements.
    pub glyphs: GlyphStatistics,

    /// The line's log-likelihood (or best-path score in hard EM).
    pub log_likelihood: f64,
}

impl LineStatistics {
    /// Append `other`.
    pub fn merge(
        &mut self,
        other: LineStatistics,
    ) {
        self.substitution.merge(&other.substitution);
        self.glyphs.merge(other.glyphs);
        self.log_likelihood += other.log_likelihood;
    }

    /// Unit-weight statistics of a single decoded path.
    ///
    /// ## Arguments
    /// * `model` - supplies the glyph type scheme for the contexts.
    /// * `line` - the decoded line's id.
    /// * `decode` - the path.
    pub fn from_path<M>(
        model: &M,
        line: LineId,
        decode: &LineDecode,
    ) -> Self
    where
        M: GlyphSubstitutionModel + ?Sized,
    {
        let mut statistics = Self {
            log_likelihood: decode.log_prob,
            ..Self::default()
        };

        let mut prev_glyph_type = GlyphType::Normal;
        let mut prev_lm_char: Option<CharId> = None;
        for (state, &width) in decode.states.iter().zip(&decode.widths) {
            let context = SubstitutionContext::new(
                state.language,
                prev_glyph_type,
                prev_lm_char,
                state.lm_char,
            );
            statistics.substitution.accumulate(context, state.glyph, 1.0);
            statistics
                .glyphs
                .record(line, state.glyph, state.position, width, 1.0, 0.0);

            prev_glyph_type = model.glyph_type_of(&state.glyph);
            prev_lm_char = Some(state.lm_char);
        }
        statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BasicGlyphSubstitutionModel,
        SubstitutionModelOptions,
        TransitionState,
        testing::UniformLanguageModel,
    };

    #[test]
    fn test_record() {
        let line = LineId::new(0, 0);
        let mut stats = GlyphStatistics::default();
        stats.record(line, GlyphChar::normal(1), 0, 3, 0.5, 0.25);
        stats.record(line, GlyphChar::normal(1), 3, 3, 0.125, 0.25);
        stats.record(line, GlyphChar::elided(1), 6, 0, 1.0, 0.25);
        stats.record(line, GlyphChar::normal(2), 6, 3, 0.0, 0.25);

        assert_eq!(stats.width_counts.len(), 1);
        assert_eq!(stats.width_counts[&(GlyphChar::normal(1), 3)], 0.625);
        assert_eq!(stats.observations.len(), 1);
        assert_eq!(stats.observations[0].start, 0);
    }

    #[test]
    fn test_merge() {
        let mut a = LineStatistics {
            log_likelihood: -1.5,
            ..LineStatistics::default()
        };
        a.glyphs.record(LineId::new(0, 0), GlyphChar::normal(0), 0, 2, 1.0, 0.0);

        let mut b = LineStatistics {
            log_likelihood: -2.0,
            ..LineStatistics::default()
        };
        b.glyphs.record(LineId::new(0, 1), GlyphChar::normal(0), 0, 2, 0.5, 0.0);

        a.merge(b);
        assert_eq!(a.log_likelihood, -3.5);
        assert_eq!(a.glyphs.total_weight(), 1.5);
        assert_eq!(a.glyphs.observations.len(), 2);
        assert_eq!(a.glyphs.observations[1].line, LineId::new(0, 1));
    }

    #[test]
    fn test_from_path() {
        let lm = UniformLanguageModel::new(["a", "b", "-"]);
        let model = BasicGlyphSubstitutionModel::from_language_model(
            &lm,
            SubstitutionModelOptions::default().with_allow_elision(true),
        )
        .unwrap();

        let decode = LineDecode {
            states: vec![
                TransitionState {
                    language: None,
                    lm_char: 0,
                    glyph: GlyphChar::normal(1),
                    position: 0,
                },
                TransitionState {
                    language: None,
                    lm_char: 1,
                    glyph: GlyphChar::elided(1),
                    position: 2,
                },
                TransitionState {
                    language: None,
                    lm_char: 0,
                    glyph: GlyphChar::normal(0),
                    position: 2,
                },
            ],
            widths: vec![2, 0, 2],
            log_prob: -4.0,
        };

        let stats = LineStatistics::from_path(&model, LineId::new(0, 0), &decode);
        assert_eq!(stats.log_likelihood, -4.0);
        assert_eq!(
            stats.substitution.get(
                &SubstitutionContext::new(None, GlyphType::Normal, None, 0),
                &GlyphChar::normal(1)
            ),
            1.0
        );
        assert_eq!(
            stats.substitution.get(
                &SubstitutionContext::new(None, GlyphType::Elided, Some(1), 0),
                &GlyphChar::normal(0)
            ),
            1.0
        );
        assert_eq!(stats.glyphs.observations.len(), 2);
    }
}
