//! # Sparse Transition Lattice
//!
//! Per-line decoding. A line's lattice enumerates sequences of
//! ``(language, LM character, glyph)`` steps across the line's pixel
//! columns; [`LineDecoder`] reads the best path (Viterbi) or the expected
//! statistics (forward-backward) out of it.
//!
//! Transition score:
//! ``lm.score_next + lm.language_switch_score + ln glyph_prob + emission_score``.

mod decoder_options;
mod external;
mod line_decoder;
pub mod sparse_lattice;
mod statistics;
mod transition_state;

pub use decoder_options::{DecoderOptions, MAX_ELISION_RUN};
pub use external::{EmissionModel, LanguageModel};
pub use line_decoder::LineDecoder;
pub use statistics::{GlyphObservation, GlyphStatistics, LineStatistics};
pub use transition_state::{LineDecode, LineId, TransitionState};
