//! # Testing Models
//!
//! Small, exact stand-ins for the external collaborators:
//! * [`SyntheticEmissionModel`] / [`SyntheticLine`] - a "font" over labelled
//!   pixel columns.
//! * [`UniformLanguageModel`] and [`BigramLanguageModel`] - character
//!   language models.

mod synthetic_emission;
mod test_language_models;

pub use synthetic_emission::{SyntheticColumn, SyntheticEmissionModel, SyntheticLine};
pub use test_language_models::{BigramLanguageModel, UniformLanguageModel};
