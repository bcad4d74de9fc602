//! # Transition States and Line Decodes

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SCResult, ScriptoriumError},
    glyph::GlyphChar,
    indexer::{CharIndexer, LanguageIndexer},
    types::{CharId, LanguageId},
};

/// One decoded step: a language-model character and the glyph printed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionState {
    /// The language; `None` is the no-language sentinel.
    pub language: Option<LanguageId>,

    /// The language-model character.
    pub lm_char: CharId,

    /// The printed glyph.
    pub glyph: GlyphChar,

    /// The first pixel column of the glyph.
    pub position: usize,
}

/// Identifies a line within a training corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId {
    /// The document index.
    pub document: usize,

    /// The line index within the document.
    pub line: usize,
}

impl LineId {
    /// Create a line id.
    pub fn new(
        document: usize,
        line: usize,
    ) -> Self {
        Self { document, line }
    }
}

impl fmt::Display for LineId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "document {} line {}", self.document, self.line)
    }
}

/// The best path through one line's lattice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineDecode {
    /// The decoded steps, left to right.
    pub states: Vec<TransitionState>,

    /// The pixel width of each state; zero for elided glyphs.
    pub widths: Vec<usize>,

    /// The path's log score.
    pub log_prob: f64,
}

impl LineDecode {
    /// The decode of a line with nothing to decode.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if there are no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The LM characters, in order.
    pub fn lm_chars(&self) -> Vec<CharId> {
        self.states.iter().map(|s| s.lm_char).collect()
    }

    /// The glyphs, in order.
    pub fn glyphs(&self) -> Vec<GlyphChar> {
        self.states.iter().map(|s| s.glyph).collect()
    }

    /// Check the decode's shape and ids.
    ///
    /// * one width per state;
    /// * elided glyphs have width zero, visible glyphs a positive width;
    /// * each state starts where the previous one ended;
    /// * every id is assigned in its indexer.
    pub fn validate(
        &self,
        chars: &CharIndexer,
        languages: &LanguageIndexer,
    ) -> SCResult<()> {
        if self.widths.len() != self.states.len() {
            return Err(ScriptoriumError::invalid_argument(
                "widths",
                format!(
                    "{} widths for {} states",
                    self.widths.len(),
                    self.states.len()
                ),
            ));
        }

        let mut position = self.states.first().map(|s| s.position).unwrap_or(0);
        for (state, &width) in self.states.iter().zip(&self.widths) {
            chars.object_of(state.lm_char)?;
            chars.object_of(state.glyph.template_char_index)?;
            if let Some(language) = state.language {
                languages.object_of(language)?;
            }

            if state.position != position {
                return Err(ScriptoriumError::invalid_argument(
                    "states",
                    format!("state at {} expected at {position}", state.position),
                ));
            }
            if state.glyph.is_elided != (width == 0) {
                return Err(ScriptoriumError::invalid_argument(
                    "widths",
                    format!("width {width} for {:?}", state.glyph),
                ));
            }
            position += width;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexers() -> (CharIndexer, LanguageIndexer) {
        (
            ["a", "b"].iter().map(|s| s.to_string()).collect(),
            ["latin"].iter().map(|s| s.to_string()).collect(),
        )
    }

    fn state(
        lm_char: CharId,
        glyph: GlyphChar,
        position: usize,
    ) -> TransitionState {
        TransitionState {
            language: Some(0),
            lm_char,
            glyph,
            position,
        }
    }

    #[test]
    fn test_line_id_display() {
        assert_eq!(LineId::new(2, 7).to_string(), "document 2 line 7");
    }

    #[test]
    fn test_validate() {
        let (chars, languages) = indexers();
        let decode = LineDecode {
            states: vec![
                state(0, GlyphChar::normal(0), 0),
                state(1, GlyphChar::elided(1), 3),
                state(1, GlyphChar::normal(0), 3),
            ],
            widths: vec![3, 0, 2],
            log_prob: -1.0,
        };
        assert!(decode.validate(&chars, &languages).is_ok());
        assert_eq!(decode.lm_chars(), vec![0, 1, 1]);
        assert_eq!(decode.len(), 3);

        let mut short = decode.clone();
        short.widths.pop();
        assert!(short.validate(&chars, &languages).is_err());

        let mut gap = decode.clone();
        gap.states[2].position = 4;
        assert!(gap.validate(&chars, &languages).is_err());

        let mut bad_id = decode.clone();
        bad_id.states[0].lm_char = 5;
        assert!(matches!(
            bad_id.validate(&chars, &languages),
            Err(ScriptoriumError::OutOfRange { id: 5, len: 2 })
        ));

        let mut bad_language = decode;
        bad_language.states[0].language = Some(1);
        assert!(bad_language.validate(&chars, &languages).is_err());
    }

    #[test]
    fn test_empty() {
        let (chars, languages) = indexers();
        let decode = LineDecode::empty();
        assert!(decode.is_empty());
        assert!(decode.validate(&chars, &languages).is_ok());
    }
}
