//! # EM Training
//!
//! Each iteration decodes every line of every document against the frozen
//! model (E-step), then re-estimates the substitution model and the
//! emission model from the reduced statistics (M-step).
//!
//! Lines are decoded in parallel with ``rayon`` (when enabled); statistics
//! are always reduced serially in ``(document, line)`` order.

mod document;
mod em_trainer;
mod trainer_options;

pub use document::{DecodeSink, Document};
pub use em_trainer::{EmTrainer, IterationSummary, TrainingReport};
pub use trainer_options::{EStepMode, EmTrainerOptions};
