//! # `scriptorium` Historical Document OCR Core
//!
//! This crate jointly decodes printed text lines and learns, by
//! Expectation-Maximization, how abstract language-model characters
//! become rendered glyphs (substitution, elision, hyphenation and
//! code-switching between languages).
//!
//! See:
//! * [`indexer`] for the character / language symbol tables.
//! * [`glyph`] for the glyph descriptor and its conditioning categories.
//! * [`substitution`] for the noisy-channel glyph substitution model.
//! * [`lattice`] for the per-line sparse transition lattice and decoders.
//! * [`training`] for the EM trainer.
//! * [`persistence`] to save and load trained models.
//! * [`output`] to consolidate decoded lines into transcriptions.
//!
//! Image processing, the visual font model and the language model are
//! external collaborators; they plug in through the
//! [`lattice::EmissionModel`] and [`lattice::LanguageModel`] traits.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//! * ``rayon``
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``.
//!
//! This is done by the ``types::CommonHash{*}`` type alias machinery.
//!
//! #### feature: ``rayon``
//!
//! The E-step decodes lines in parallel with ``rayon``.
//! Statistics are always reduced in document/line order, so the result
//! does not depend on the number of threads.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
//!
//! #### feature: ``testing``
//!
//! Exposes the synthetic emission and language models in the ``testing`` module.
//!
//! ## Training Example
//!
//! The synthetic models require the ``testing`` feature.
//!
//! ```rust,ignore
//! use scriptorium::{
//!     BasicGlyphSubstitutionModel,
//!     Document,
//!     EmTrainer,
//!     EmTrainerOptions,
//!     SubstitutionModelOptions,
//!     testing::{SyntheticEmissionModel, SyntheticLine, UniformLanguageModel},
//! };
//!
//! let lm = UniformLanguageModel::new(["a", "b", "-"]);
//! let mut model = BasicGlyphSubstitutionModel::from_language_model(
//!     &lm,
//!     SubstitutionModelOptions::default(),
//! )
//! .unwrap();
//!
//! let mut font = SyntheticEmissionModel::uniform_width(3, 2);
//! let line = SyntheticLine::render(&font, &[0, 1, 0]);
//! let documents = vec![Document::new("page-1", vec![line])];
//!
//! let trainer = EmTrainer::new(EmTrainerOptions::default().with_num_iterations(2));
//! let report = trainer
//!     .train(&mut model, &lm, &mut font, &documents, &mut ())
//!     .unwrap();
//! assert_eq!(report.iterations.len(), 2);
//! ```
#![warn(missing_docs, unused)]

pub mod errors;
pub mod glyph;
pub mod indexer;
pub mod lattice;
pub mod output;
pub mod persistence;
pub mod substitution;
pub mod training;
pub mod types;
pub mod utility;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[doc(inline)]
pub use errors::{SCResult, ScriptoriumError};
#[doc(inline)]
pub use glyph::{GlyphChar, GlyphSpace, GlyphType, GlyphTypeScheme};
#[doc(inline)]
pub use indexer::{CharIndexer, LanguageIndexer, SymbolIndexer};
#[doc(inline)]
pub use lattice::{
    DecoderOptions,
    EmissionModel,
    LanguageModel,
    LineDecode,
    LineDecoder,
    LineId,
    TransitionState,
};
#[doc(inline)]
pub use substitution::{
    BasicGlyphSubstitutionModel,
    GlyphSubstitutionModel,
    SubstitutionContext,
    SubstitutionCounts,
    SubstitutionModelOptions,
    SubstitutionPrior,
};
#[doc(inline)]
pub use training::{
    DecodeSink,
    Document,
    EStepMode,
    EmTrainer,
    EmTrainerOptions,
    IterationSummary,
    TrainingReport,
};

/// The crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
