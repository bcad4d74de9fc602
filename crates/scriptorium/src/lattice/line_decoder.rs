//! # Line Decoder
//!
//! Builds the [`SparseLattice`] of one line against a substitution model, a
//! language model and an emission model, and reads either the best path or
//! the expected statistics out of it.

use std::time::Instant;

use crate::{
    errors::{SCResult, ScriptoriumError},
    glyph::{GlyphChar, GlyphSpace},
    lattice::{
        DecoderOptions,
        EmissionModel,
        LanguageModel,
        LineDecode,
        LineId,
        LineStatistics,
        TransitionState,
        sparse_lattice::{NodeId, SparseLattice, StateKey},
    },
    substitution::{GlyphSubstitutionModel, SubstitutionContext},
    types::{CharId, LanguageId},
};

/// How often the wall-clock budget is checked, in expansions.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// Decodes lines with a fixed set of models.
///
/// The decoder only reads its models, so one decoder may be shared by
/// every worker of an E-step.
pub struct LineDecoder<'a, M, L, E>
where
    M: GlyphSubstitutionModel + ?Sized,
    L: LanguageModel + ?Sized,
    E: EmissionModel,
{
    model: &'a M,
    lm: &'a L,
    emission: &'a E,
    options: DecoderOptions,

    space: GlyphSpace,
    hyphen: Option<CharId>,
    languages: Vec<Option<LanguageId>>,
    context_len: usize,
}

impl<'a, M, L, E> LineDecoder<'a, M, L, E>
where
    M: GlyphSubstitutionModel + ?Sized,
    L: LanguageModel + ?Sized,
    E: EmissionModel,
{
    /// Create a decoder.
    ///
    /// ## Errors
    /// [`ScriptoriumError::InvalidArgument`] for invalid options.
    pub fn new(
        model: &'a M,
        lm: &'a L,
        emission: &'a E,
        options: DecoderOptions,
    ) -> SCResult<Self> {
        options.validate()?;

        let num_languages = model.language_indexer().len();
        let languages = if num_languages == 0 {
            vec![None]
        } else {
            (0..num_languages).map(Some).collect()
        };

        Ok(Self {
            model,
            lm,
            emission,
            options,
            space: model.glyph_space(),
            hyphen: model.hyphen_char(),
            languages,
            context_len: lm.order().saturating_sub(1),
        })
    }

    /// The decoder options.
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// The highest-scoring path through the line.
    ///
    /// ## Returns
    /// An empty decode for a zero-width line or an empty alphabet.
    ///
    /// ## Errors
    /// [`ScriptoriumError::NoViablePath`] if no complete path has a finite
    /// score, or a budget is exceeded.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn decode_best_path(
        &self,
        line: &E::Line,
    ) -> SCResult<LineDecode> {
        let Some(lattice) = self.build(line)? else {
            return Ok(LineDecode::empty());
        };
        let end = lattice
            .best_terminal()
            .ok_or_else(|| ScriptoriumError::no_viable_path("no complete path"))?;

        let path = lattice.backtrack(end);
        Ok(LineDecode {
            states: path.iter().map(|edge| edge.state).collect(),
            widths: path.iter().map(|edge| edge.width).collect(),
            log_prob: lattice.node(end).viterbi,
        })
    }

    /// Expected substitution counts and glyph placements, by forward-backward.
    ///
    /// ## Arguments
    /// * `line_id` - recorded on every glyph observation.
    /// * `line` - the line image.
    ///
    /// ## Errors
    /// [`ScriptoriumError::NoViablePath`] as for [`Self::decode_best_path`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(line = %line_id)))]
    pub fn decode_posterior(
        &self,
        line_id: LineId,
        line: &E::Line,
    ) -> SCResult<LineStatistics> {
        let Some(lattice) = self.build(line)? else {
            return Ok(LineStatistics::default());
        };

        let log_z = lattice.log_partition();
        if !log_z.is_finite() {
            return Err(ScriptoriumError::no_viable_path("no complete path"));
        }
        let backward = lattice.backward();

        let mut statistics = LineStatistics {
            log_likelihood: log_z,
            ..LineStatistics::default()
        };
        for edge in lattice.edges() {
            let source = lattice.node(edge.from);
            let weight = (source.forward + edge.score + backward[edge.to] - log_z).exp();
            if weight.is_nan() || weight <= 0.0 || weight.is_infinite() {
                continue;
            }

            let context = SubstitutionContext::new(
                edge.state.language,
                source.key.prev_glyph_type,
                source.key.prev_lm_char,
                edge.state.lm_char,
            );
            statistics
                .substitution
                .accumulate(context, edge.state.glyph, weight);
            statistics.glyphs.record(
                line_id,
                edge.state.glyph,
                edge.state.position,
                edge.width,
                weight,
                self.options.min_observation_weight,
            );
        }

        log::debug!(
            "{line_id}: {} nodes, {} edges, log likelihood {log_z}",
            lattice.num_nodes(),
            lattice.edges().len()
        );
        Ok(statistics)
    }

    /// Expand the lattice of a line.
    ///
    /// ## Returns
    /// `None` if there is nothing to decode.
    fn build(
        &self,
        line: &E::Line,
    ) -> SCResult<Option<SparseLattice>> {
        let width = self.emission.line_width(line);
        if width == 0 || self.space.is_empty() {
            return Ok(None);
        }

        let deadline = self.options.max_line_duration.map(|d| Instant::now() + d);
        let mut expansions = 0usize;
        let mut lattice = SparseLattice::new(width);

        for position in 0..=width {
            // Elided transitions append deeper layers at the same position.
            let mut layer_start = 0;
            loop {
                let layer: Vec<NodeId> = lattice.nodes_at(position)[layer_start..].to_vec();
                if layer.is_empty() {
                    break;
                }
                layer_start += layer.len();

                if let Some(beam_width) = self.options.beam_width {
                    lattice.prune(&layer, beam_width);
                }

                for node in layer {
                    if lattice.node(node).pruned {
                        continue;
                    }

                    expansions += 1;
                    if let Some(max) = self.options.max_expansions
                        && expansions > max
                    {
                        return Err(ScriptoriumError::no_viable_path(format!(
                            "expansion budget of {max} exceeded"
                        )));
                    }
                    if let Some(deadline) = deadline
                        && expansions % DEADLINE_CHECK_INTERVAL == 0
                        && Instant::now() > deadline
                    {
                        return Err(ScriptoriumError::no_viable_path("time budget exceeded"));
                    }

                    self.expand(&mut lattice, line, node);
                }
            }
        }

        Ok(Some(lattice))
    }

    /// Add every viable transition out of `node`.
    fn expand(
        &self,
        lattice: &mut SparseLattice,
        line: &E::Line,
        node: NodeId,
    ) {
        let from = lattice.node(node);
        let key = from.key.clone();
        let position = from.position;
        let width = lattice.width();

        for &language in &self.languages {
            let switch_score = self.lm.language_switch_score(key.language, language);
            if !switch_score.is_finite() {
                continue;
            }

            for lm_char in 0..self.space.num_chars {
                let repeat_hyphen = self.hyphen.is_some()
                    && self.hyphen == Some(lm_char)
                    && key.prev_lm_char == self.hyphen;
                let lm_score = if repeat_hyphen {
                    0.0
                } else {
                    self.lm.score_next(&key.context, lm_char, language)
                };
                if !lm_score.is_finite() {
                    continue;
                }

                let context = if repeat_hyphen {
                    key.context.clone()
                } else {
                    self.extend_context(&key.context, lm_char)
                };

                for glyph in self.glyph_candidates(lm_char) {
                    if glyph.is_elided && key.elision_run >= self.options.max_consecutive_elisions {
                        continue;
                    }

                    let prob = self.model.glyph_prob(
                        language,
                        key.prev_glyph_type,
                        key.prev_lm_char,
                        lm_char,
                        &glyph,
                    );
                    if prob.is_nan() || prob <= 0.0 {
                        continue;
                    }
                    let base = lm_score + switch_score + prob.ln();

                    let next = StateKey {
                        language,
                        context: context.clone(),
                        prev_glyph_type: self.model.glyph_type_of(&glyph),
                        prev_lm_char: Some(lm_char),
                        elision_run: if glyph.is_elided { key.elision_run + 1 } else { 0 },
                    };
                    let state = TransitionState {
                        language,
                        lm_char,
                        glyph,
                        position,
                    };

                    if glyph.is_elided {
                        lattice.add_edge(node, next, state, 0, base);
                        continue;
                    }

                    for glyph_width in self.emission.width_range(&glyph) {
                        if glyph_width == 0 || position + glyph_width > width {
                            continue;
                        }
                        let score = base
                            + self
                                .emission
                                .emission_score(line, &glyph, position, glyph_width);
                        if score.is_finite() {
                            lattice.add_edge(node, next.clone(), state, glyph_width, score);
                        }
                    }
                }
            }
        }
    }

    fn extend_context(
        &self,
        context: &[CharId],
        lm_char: CharId,
    ) -> Vec<CharId> {
        if self.context_len == 0 {
            return Vec::new();
        }
        let keep = context.len().min(self.context_len - 1);
        let mut next = Vec::with_capacity(keep + 1);
        next.extend_from_slice(&context[context.len() - keep..]);
        next.push(lm_char);
        next
    }

    fn glyph_candidates(
        &self,
        lm_char: CharId,
    ) -> Vec<GlyphChar> {
        if self.model.allows_glyph_substitution() {
            self.space.candidates(lm_char).collect()
        } else {
            vec![GlyphChar::normal(lm_char)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BasicGlyphSubstitutionModel,
        SubstitutionModelOptions,
        SubstitutionPrior,
        glyph::GlyphType,
        lattice::MAX_ELISION_RUN,
        testing::{BigramLanguageModel, SyntheticEmissionModel, SyntheticLine, UniformLanguageModel},
    };

    fn model(
        lm: &UniformLanguageModel,
        options: SubstitutionModelOptions,
    ) -> BasicGlyphSubstitutionModel {
        BasicGlyphSubstitutionModel::from_language_model(lm, options).unwrap()
    }

    /// A model that prefers printing each character as itself.
    fn identity_biased(lm: &UniformLanguageModel) -> BasicGlyphSubstitutionModel {
        model(lm, SubstitutionModelOptions::default())
            .with_prior(SubstitutionPrior::identity_biased(10.0))
            .unwrap()
    }

    #[test]
    fn test_single_character_line() {
        let lm = UniformLanguageModel::new(["a", "b", "-"]);
        let model = model(&lm, SubstitutionModelOptions::default());
        let font = SyntheticEmissionModel::uniform_width(3, 2);
        let line = SyntheticLine::render(&font, &[0]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let decode = decoder.decode_best_path(&line).unwrap();

        assert_eq!(decode.len(), 1);
        assert_eq!(decode.states[0].lm_char, 0);
        assert_eq!(decode.states[0].glyph.template_char_index, 0);
        assert_eq!(decode.widths, vec![2]);
        assert!(
            decode
                .validate(model.character_indexer(), model.language_indexer())
                .is_ok()
        );
    }

    #[test]
    fn test_decode_matches_rendering() {
        let lm = UniformLanguageModel::new(["a", "b", "c"]);
        let model = identity_biased(&lm);
        let font = SyntheticEmissionModel::uniform_width(3, 2);
        let text = [2, 0, 1, 1, 0];
        let line = SyntheticLine::render(&font, &text);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let decode = decoder.decode_best_path(&line).unwrap();
        assert_eq!(decode.lm_chars(), text.to_vec());
        assert_eq!(
            decode.glyphs(),
            text.iter().map(|&c| GlyphChar::normal(c)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_viterbi_is_deterministic() {
        let lm = UniformLanguageModel::new(["a", "b", "c"]);
        let model = model(&lm, SubstitutionModelOptions::default().with_allow_elision(true));
        // Every glyph explains every column equally well: ties everywhere.
        let font = SyntheticEmissionModel::uniform_width(3, 1).with_scores(-1.0, -1.0);
        let line = SyntheticLine::render(&font, &[0, 1, 2, 0]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let first = decoder.decode_best_path(&line).unwrap();
        for _ in 0..5 {
            assert_eq!(decoder.decode_best_path(&line).unwrap(), first);
        }
        // Lower lm_char ids win ties.
        assert!(first.states.iter().all(|s| s.lm_char == 0));
    }

    #[test]
    fn test_identity_model_never_substitutes() {
        let lm = UniformLanguageModel::new(["a", "b", "c"]);
        let model = model(&lm, SubstitutionModelOptions::default().with_allow_glyph_substitution(false));
        let font = SyntheticEmissionModel::uniform_width(3, 2);
        let line = SyntheticLine::render(&font, &[1, 2, 2]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let decode = decoder.decode_best_path(&line).unwrap();
        assert!(!decode.is_empty());
        assert!(
            decode
                .states
                .iter()
                .all(|s| s.glyph.is_identity_of(s.lm_char))
        );

        let stats = decoder.decode_posterior(LineId::new(0, 0), &line).unwrap();
        for (context, glyphs) in stats.substitution.sorted_contexts() {
            for glyph in glyphs.keys() {
                assert!(glyph.is_identity_of(context.lm_char));
            }
        }
    }

    #[test]
    fn test_empty_line_and_alphabet() {
        let lm = UniformLanguageModel::new(["a"]);
        let single = model(&lm, SubstitutionModelOptions::default());
        let font = SyntheticEmissionModel::uniform_width(1, 2);
        let line = SyntheticLine::render(&font, &[]);

        let decoder = LineDecoder::new(&single, &lm, &font, DecoderOptions::default()).unwrap();
        assert!(decoder.decode_best_path(&line).unwrap().is_empty());
        let stats = decoder.decode_posterior(LineId::new(0, 0), &line).unwrap();
        assert!(stats.substitution.is_empty());

        let empty_lm = UniformLanguageModel::new(Vec::<String>::new());
        let empty_model = model(&empty_lm, SubstitutionModelOptions::default());
        let line = SyntheticLine::render(&font, &[0, 0]);
        let decoder = LineDecoder::new(&empty_model, &empty_lm, &font, DecoderOptions::default()).unwrap();
        assert!(decoder.decode_best_path(&line).unwrap().is_empty());
    }

    #[test]
    fn test_no_viable_path() {
        let lm = UniformLanguageModel::new(["a", "b"]);
        let model = model(&lm, SubstitutionModelOptions::default());
        // Every glyph is 2 columns wide; a 3-column line cannot be tiled.
        let font = SyntheticEmissionModel::uniform_width(2, 2);
        let line = SyntheticLine::blank(3);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let err = decoder.decode_best_path(&line).unwrap_err();
        assert!(err.is_line_local());
        let err = decoder.decode_posterior(LineId::new(0, 0), &line).unwrap_err();
        assert!(err.is_line_local());
    }

    #[test]
    fn test_zero_smoothing_no_viable_path() {
        let lm = UniformLanguageModel::new(["a", "b"]);
        let mut model = model(&lm, SubstitutionModelOptions::default().with_smoothing_count(0.0));
        // Line-start context of "a" and "b" only ever printed "b".
        for lm_char in 0..2 {
            model.accumulate(
                SubstitutionContext::new(None, GlyphType::Normal, None, lm_char),
                GlyphChar::normal(1),
                1.0,
            );
        }
        model.normalize().unwrap();

        // The font cannot render "b" over these columns.
        let font = SyntheticEmissionModel::uniform_width(2, 1).with_scores(0.0, f64::NEG_INFINITY);
        let line = SyntheticLine::render(&font, &[0]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        assert!(matches!(
            decoder.decode_best_path(&line),
            Err(ScriptoriumError::NoViablePath { .. })
        ));
    }

    #[test]
    fn test_expansion_budget() {
        let lm = UniformLanguageModel::new(["a", "b"]);
        let model = model(&lm, SubstitutionModelOptions::default());
        let font = SyntheticEmissionModel::uniform_width(2, 1);
        let line = SyntheticLine::render(&font, &[0, 1, 0, 1]);

        let options = DecoderOptions::default().with_max_expansions(Some(2));
        let decoder = LineDecoder::new(&model, &lm, &font, options).unwrap();
        assert!(matches!(
            decoder.decode_best_path(&line),
            Err(ScriptoriumError::NoViablePath { .. })
        ));
    }

    #[test]
    fn test_beam_keeps_best_path() {
        let lm = UniformLanguageModel::new(["a", "b", "c"]);
        let model = identity_biased(&lm);
        let font = SyntheticEmissionModel::uniform_width(3, 2);
        let text = [1, 2, 0];
        let line = SyntheticLine::render(&font, &text);

        let options = DecoderOptions::default().with_beam_width(Some(1));
        let decoder = LineDecoder::new(&model, &lm, &font, options).unwrap();
        assert_eq!(decoder.decode_best_path(&line).unwrap().lm_chars(), text.to_vec());
    }

    #[test]
    fn test_elision_decodes_zero_width_states() {
        let lm = UniformLanguageModel::new(["a", "b"]);
        let model = model(&lm, SubstitutionModelOptions::default().with_allow_elision(true));
        let font = SyntheticEmissionModel::uniform_width(2, 2);
        let line = SyntheticLine::render(&font, &[0, 1]);

        let options = DecoderOptions::default().with_max_consecutive_elisions(1);
        let decoder = LineDecoder::new(&model, &lm, &font, options).unwrap();
        let stats = decoder.decode_posterior(LineId::new(0, 0), &line).unwrap();

        let elided: f64 = stats
            .substitution
            .sorted_contexts()
            .iter()
            .flat_map(|(_, glyphs)| glyphs.iter())
            .filter(|(glyph, _)| glyph.is_elided)
            .map(|(_, weight)| *weight)
            .sum();
        assert!(elided > 0.0);
        assert!(
            stats
                .glyphs
                .observations
                .iter()
                .all(|o| !o.glyph.is_elided && o.width == 2)
        );
    }

    #[test]
    fn test_posterior_counts_one_glyph_per_column_span() {
        let lm = UniformLanguageModel::new(["a", "b"]);
        let model = model(&lm, SubstitutionModelOptions::default());
        let font = SyntheticEmissionModel::uniform_width(2, 2);
        let line = SyntheticLine::render(&font, &[0, 1, 1]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let stats = decoder.decode_posterior(LineId::new(3, 4), &line).unwrap();

        // Without elision every path has exactly three glyphs.
        assert!((stats.substitution.total_weight() - 3.0).abs() < 1e-9);
        assert!((stats.glyphs.total_weight() - 3.0).abs() < 1e-9);
        assert!(stats.log_likelihood.is_finite());
        assert!(stats.glyphs.observations.iter().all(|o| o.line == LineId::new(3, 4)));
    }

    #[test]
    fn test_hyphen_repeat_is_free_in_the_language_model() {
        let lm = BigramLanguageModel::train(["a", "-"], &[("latin", "aaaa-")], -5.0);
        let model = BasicGlyphSubstitutionModel::from_language_model(
            &lm,
            SubstitutionModelOptions::default().with_allow_glyph_substitution(false),
        )
        .unwrap();
        let font = SyntheticEmissionModel::uniform_width(2, 1);
        let line = SyntheticLine::render(&font, &[1, 1]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let decode = decoder.decode_best_path(&line).unwrap();
        assert_eq!(decode.lm_chars(), vec![1, 1]);

        // Only the first hyphen is charged by the language model.
        let first = lm.score_next(&[], 1, Some(0));
        let match_score = font.match_score();
        assert!((decode.log_prob - (first + 2.0 * match_score)).abs() < 1e-9);
    }

    #[test]
    fn test_language_switch_penalty() {
        let lm = BigramLanguageModel::train(
            ["a", "b"],
            &[("first", "aaaa"), ("second", "bbbb")],
            -0.5,
        );
        let model = BasicGlyphSubstitutionModel::from_language_model(
            &lm,
            SubstitutionModelOptions::default().with_allow_glyph_substitution(false),
        )
        .unwrap();
        let font = SyntheticEmissionModel::uniform_width(2, 1);
        let line = SyntheticLine::render(&font, &[0, 0, 1, 1]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let decode = decoder.decode_best_path(&line).unwrap();
        assert_eq!(decode.lm_chars(), vec![0, 0, 1, 1]);

        let languages: Vec<_> = decode.states.iter().map(|s| s.language).collect();
        assert_eq!(languages, vec![Some(0), Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_tied_languages_prefer_lower_lm_char() {
        // "bb" in the first language and "aa" in the second score exactly the same.
        let lm = BigramLanguageModel::train(["a", "b"], &[("first", "bbbb"), ("second", "aaaa")], -1.0);
        let model = BasicGlyphSubstitutionModel::from_language_model(
            &lm,
            SubstitutionModelOptions::default().with_allow_glyph_substitution(false),
        )
        .unwrap();
        let font = SyntheticEmissionModel::uniform_width(2, 1).with_scores(-1.0, -1.0);
        let line = SyntheticLine::render(&font, &[0, 1]);

        let decoder = LineDecoder::new(&model, &lm, &font, DecoderOptions::default()).unwrap();
        let decode = decoder.decode_best_path(&line).unwrap();
        assert_eq!(decode.lm_chars(), vec![0, 0]);

        let languages: Vec<_> = decode.states.iter().map(|s| s.language).collect();
        assert_eq!(languages, vec![Some(1), Some(1)]);
    }

    #[test]
    fn test_unbounded_elision_run_is_rejected() {
        let lm = UniformLanguageModel::new(["a", "b"]);
        let model = model(&lm, SubstitutionModelOptions::default().with_allow_elision(true));
        let font = SyntheticEmissionModel::uniform_width(2, 1);

        let options = DecoderOptions::default().with_max_consecutive_elisions(usize::MAX);
        assert!(matches!(
            LineDecoder::new(&model, &lm, &font, options),
            Err(ScriptoriumError::InvalidArgument {
                arg: "max_consecutive_elisions",
                ..
            })
        ));

        let options = DecoderOptions::default().with_max_consecutive_elisions(MAX_ELISION_RUN);
        let decoder = LineDecoder::new(&model, &lm, &font, options).unwrap();
        let line = SyntheticLine::render(&font, &[0, 1]);
        assert_eq!(
            decoder.decode_best_path(&line).unwrap().glyphs(),
            vec![GlyphChar::normal(0), GlyphChar::normal(1)]
        );
    }
}
