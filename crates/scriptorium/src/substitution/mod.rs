//! # Glyph Substitution Model
//!
//! The noisy channel from language-model characters to printed glyphs:
//! ``P(glyph | language, prev_glyph_type, prev_lm_char, lm_char)``.
//!
//! [`GlyphSubstitutionModel`] is the read-only view used by the decoders;
//! [`BasicGlyphSubstitutionModel`] is the trainable table. Expected counts
//! are gathered per line in [`SubstitutionCounts`] and merged in line order.

mod basic_substitution_model;
mod glyph_substitution_model;
mod substitution_counts;
mod substitution_options;
mod substitution_prior;

pub use basic_substitution_model::{
    BasicGlyphSubstitutionModel,
    DISTRIBUTION_TOLERANCE,
    ModelSummary,
};
pub use glyph_substitution_model::GlyphSubstitutionModel;
pub use substitution_counts::{SubstitutionContext, SubstitutionCounts};
pub use substitution_options::SubstitutionModelOptions;
pub use substitution_prior::{PairPseudoCount, SubstitutionPrior};
