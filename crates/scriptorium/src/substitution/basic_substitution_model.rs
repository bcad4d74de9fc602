//! # Basic Glyph Substitution Model
//!
//! A table of per-context glyph distributions estimated by smoothed
//! expected counts. Contexts never seen in training share an "unseen"
//! distribution that depends only on the prior.

use core::fmt;

use crate::{
    errors::{SCResult, ScriptoriumError},
    glyph::{GlyphChar, GlyphSpace, GlyphType, GlyphTypeScheme},
    indexer::{CharIndexer, LanguageIndexer, charset},
    lattice::LanguageModel,
    substitution::{
        GlyphSubstitutionModel,
        SubstitutionContext,
        SubstitutionCounts,
        SubstitutionModelOptions,
        SubstitutionPrior,
        substitution_prior::ResolvedPrior,
    },
    types::{CharId, CommonHashMap, LanguageId},
};

/// Allowed deviation of a normalized distribution's sum from one.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// The trainable glyph substitution model.
///
/// Lifecycle: construct (prior only), [`accumulate`](Self::accumulate) or
/// [`absorb`](Self::absorb) expected counts, [`normalize`](Self::normalize),
/// repeat; persist with [`crate::persistence`].
#[derive(Debug, Clone)]
pub struct BasicGlyphSubstitutionModel {
    chars: CharIndexer,
    languages: LanguageIndexer,
    options: SubstitutionModelOptions,
    prior: SubstitutionPrior,
    resolved_prior: ResolvedPrior,
    space: GlyphSpace,
    hyphen: Option<CharId>,

    /// ``[lm_char][glyph_id]`` for contexts without a trained distribution.
    unseen: Vec<Vec<f64>>,

    /// ``context -> [glyph_id]``.
    table: CommonHashMap<SubstitutionContext, Vec<f64>>,

    pending: SubstitutionCounts,
}

impl BasicGlyphSubstitutionModel {
    /// Build a model holding only the prior.
    ///
    /// Both indexers are frozen.
    ///
    /// ## Arguments
    /// * `chars` - the LM alphabet.
    /// * `languages` - the language names; may be empty.
    /// * `options` - the model options.
    /// * `prior` - pseudo-counts added to every context.
    ///
    /// ## Errors
    /// * [`ScriptoriumError::InvalidArgument`] for invalid options or prior counts.
    /// * [`ScriptoriumError::UnknownSymbol`] if the prior names a symbol not in `chars`.
    pub fn new(
        chars: CharIndexer,
        languages: LanguageIndexer,
        options: SubstitutionModelOptions,
        prior: SubstitutionPrior,
    ) -> SCResult<Self> {
        options.validate()?;

        let chars = chars.frozen();
        let languages = languages.frozen();
        let space = options.glyph_space(chars.len());
        let resolved_prior = prior.resolve(&chars, &space)?;
        let hyphen = chars.get_index(charset::HYPHEN);

        let mut model = Self {
            chars,
            languages,
            options,
            prior,
            resolved_prior,
            space,
            hyphen,
            unseen: Vec::new(),
            table: CommonHashMap::new(),
            pending: SubstitutionCounts::new(),
        };

        let unseen = (0..model.chars.len())
            .map(|lm_char| {
                let probs = model.distribution(lm_char, None);
                check_distribution(&probs, || format!("unseen context of lm_char {lm_char}"))?;
                Ok(probs)
            })
            .collect::<SCResult<Vec<_>>>()?;
        model.unseen = unseen;

        Ok(model)
    }

    /// Build a prior-only model over a language model's alphabet and languages.
    pub fn from_language_model<L>(
        lm: &L,
        options: SubstitutionModelOptions,
    ) -> SCResult<Self>
    where
        L: LanguageModel + ?Sized,
    {
        Self::new(
            lm.alphabet().into_iter().collect(),
            lm.languages().into_iter().collect(),
            options,
            SubstitutionPrior::uniform(),
        )
    }

    /// Rebuild this model's prior-only state with a different prior.
    ///
    /// Trained distributions and pending counts are discarded.
    pub fn with_prior(
        self,
        prior: SubstitutionPrior,
    ) -> SCResult<Self> {
        Self::new(self.chars, self.languages, self.options, prior)
    }

    /// Restore a model from trained distributions.
    ///
    /// Each distribution is indexed by glyph id and stored as given.
    pub(crate) fn from_trained(
        chars: CharIndexer,
        languages: LanguageIndexer,
        options: SubstitutionModelOptions,
        prior: SubstitutionPrior,
        contexts: Vec<(SubstitutionContext, Vec<f64>)>,
    ) -> SCResult<Self> {
        let mut model = Self::new(chars, languages, options, prior)?;
        let expected = model.space.len();
        for (context, probs) in contexts {
            if probs.len() != expected || context.lm_char >= model.chars.len() {
                return Err(ScriptoriumError::invalid_argument(
                    "contexts",
                    format!(
                        "{context:?} has {} probabilities; expected {expected}",
                        probs.len()
                    ),
                ));
            }
            model.table.insert(context, probs);
        }
        Ok(model)
    }

    /// The model options.
    pub fn options(&self) -> &SubstitutionModelOptions {
        &self.options
    }

    /// The prior.
    pub fn prior(&self) -> &SubstitutionPrior {
        &self.prior
    }

    /// Trained distributions, in context order, indexed by glyph id.
    pub fn trained_contexts(&self) -> Vec<(SubstitutionContext, &[f64])> {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|(context, probs)| (*context, probs.as_slice()))
            .collect();
        entries.sort_by_key(|(context, _)| *context);
        entries
    }

    /// Counts accumulated since the last [`normalize`](Self::normalize).
    pub fn pending_counts(&self) -> &SubstitutionCounts {
        &self.pending
    }

    /// Add an expected count.
    pub fn accumulate(
        &mut self,
        context: SubstitutionContext,
        glyph: GlyphChar,
        weight: f64,
    ) {
        self.pending.accumulate(context, glyph, weight);
    }

    /// Add a merged accumulator.
    pub fn absorb(
        &mut self,
        counts: &SubstitutionCounts,
    ) {
        self.pending.merge(counts);
    }

    /// Replace the trained distributions with the smoothed pending counts.
    ///
    /// For each context with counts ``c``:
    /// ``p(g) = (c(g) + alpha + prior(g)) / sum_g' (c(g') + alpha + prior(g'))``.
    /// Contexts without counts fall back to the unseen distribution.
    /// Pending counts are cleared, even on failure.
    ///
    /// ## Errors
    /// [`ScriptoriumError::InvalidDistribution`] if a context does not sum to one;
    /// the previous distributions are kept.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn normalize(&mut self) -> SCResult<()> {
        let pending = self.pending.take();

        let mut table = CommonHashMap::with_capacity(pending.num_contexts());
        for (context, counts) in pending.sorted_contexts() {
            if context.lm_char >= self.chars.len() {
                return Err(ScriptoriumError::OutOfRange {
                    id: context.lm_char,
                    len: self.chars.len(),
                });
            }
            let probs = self.distribution(context.lm_char, Some(counts));
            check_distribution(&probs, || format!("{context:?}"))?;
            table.insert(*context, probs);
        }

        log::debug!(
            "normalized {} contexts ({} total weight)",
            table.len(),
            pending.total_weight()
        );
        self.table = table;
        Ok(())
    }

    /// Smoothed distribution over the glyph ids of `lm_char`.
    fn distribution(
        &self,
        lm_char: CharId,
        counts: Option<&std::collections::BTreeMap<GlyphChar, f64>>,
    ) -> Vec<f64> {
        let size = self.space.len();
        let mut mass = vec![self.options.smoothing_count; size];
        for (glyph_id, glyph) in self.space.candidates(lm_char).enumerate() {
            mass[glyph_id] += self.resolved_prior.pseudo_count(lm_char, &glyph);
        }

        for (glyph, count) in counts.into_iter().flatten() {
            match self.space.glyph_id(lm_char, glyph) {
                Some(glyph_id) => mass[glyph_id] += count,
                None => log::debug!("dropping count for {glyph:?} outside the space of {lm_char}"),
            }
        }

        let total: f64 = mass.iter().sum();
        if total > 0.0 {
            mass.iter_mut().for_each(|m| *m /= total);
        } else {
            mass.fill(1.0 / size as f64);
        }
        mass
    }

    /// Describe the model.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            num_chars: self.chars.len(),
            num_languages: self.languages.len(),
            glyph_space_size: self.space.len(),
            glyph_type_scheme: self.options.glyph_type_scheme,
            num_glyph_types: self.options.glyph_type_scheme.num_types(),
            num_trained_contexts: self.table.len(),
            num_pending_contexts: self.pending.num_contexts(),
            allow_glyph_substitution: self.options.allow_glyph_substitution,
            smoothing_count: self.options.smoothing_count,
        }
    }
}

fn check_distribution<F>(
    probs: &[f64],
    describe: F,
) -> SCResult<()>
where
    F: FnOnce() -> String,
{
    let sum: f64 = probs.iter().sum();
    let valid = (sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE;
    if valid {
        Ok(())
    } else {
        Err(ScriptoriumError::InvalidDistribution {
            context: describe(),
            sum,
        })
    }
}

impl GlyphSubstitutionModel for BasicGlyphSubstitutionModel {
    fn language_indexer(&self) -> &LanguageIndexer {
        &self.languages
    }

    fn character_indexer(&self) -> &CharIndexer {
        &self.chars
    }

    fn glyph_space(&self) -> GlyphSpace {
        self.space
    }

    fn glyph_type_scheme(&self) -> GlyphTypeScheme {
        self.options.glyph_type_scheme
    }

    fn allows_glyph_substitution(&self) -> bool {
        self.options.allow_glyph_substitution
    }

    fn glyph_prob(
        &self,
        language: Option<LanguageId>,
        prev_glyph_type: GlyphType,
        prev_lm_char: Option<CharId>,
        lm_char: CharId,
        glyph: &GlyphChar,
    ) -> f64 {
        let Some(glyph_id) = self.space.glyph_id(lm_char, glyph) else {
            return 0.0;
        };
        if !self.options.allow_glyph_substitution {
            return if glyph.is_identity_of(lm_char) { 1.0 } else { 0.0 };
        }

        let context = SubstitutionContext::new(language, prev_glyph_type, prev_lm_char, lm_char);
        match self.table.get(&context) {
            Some(probs) => probs[glyph_id],
            None => self.unseen[lm_char][glyph_id],
        }
    }

    fn hyphen_char(&self) -> Option<CharId> {
        self.hyphen
    }
}

/// A description of a [`BasicGlyphSubstitutionModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Size of the LM alphabet.
    pub num_chars: usize,

    /// Number of languages.
    pub num_languages: usize,

    /// Number of candidate glyphs per LM character.
    pub glyph_space_size: usize,

    /// The glyph type scheme.
    pub glyph_type_scheme: GlyphTypeScheme,

    /// Number of glyph types in the scheme.
    pub num_glyph_types: usize,

    /// Number of contexts with a trained distribution.
    pub num_trained_contexts: usize,

    /// Number of contexts with counts awaiting normalization.
    pub num_pending_contexts: usize,

    /// Whether substitution is allowed.
    pub allow_glyph_substitution: bool,

    /// The smoothing pseudo-count.
    pub smoothing_count: f64,
}

impl fmt::Display for ModelSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "characters:        {}", self.num_chars)?;
        writeln!(f, "languages:         {}", self.num_languages)?;
        writeln!(f, "glyph space:       {}", self.glyph_space_size)?;
        writeln!(
            f,
            "glyph types:       {} ({:?})",
            self.num_glyph_types, self.glyph_type_scheme
        )?;
        writeln!(f, "trained contexts:  {}", self.num_trained_contexts)?;
        writeln!(f, "pending contexts:  {}", self.num_pending_contexts)?;
        writeln!(f, "substitution:      {}", self.allow_glyph_substitution)?;
        write!(f, "smoothing count:   {}", self.smoothing_count)
    }
}
