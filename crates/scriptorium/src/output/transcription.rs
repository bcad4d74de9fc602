//! # Line Consolidation

use crate::{
    errors::SCResult,
    indexer::{CharIndexer, charset},
    lattice::{LineDecode, TransitionState},
};

/// One consolidated output line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscribedLine {
    /// The printed symbols; elided glyphs are omitted.
    pub visible: Vec<String>,

    /// The LM symbols of the kept states.
    pub lm_chars: Vec<String>,

    /// The kept states.
    pub states: Vec<TransitionState>,

    /// The widths of the kept states.
    pub widths: Vec<usize>,
}

impl TranscribedLine {
    /// The printed text, with escaped symbols as-is.
    pub fn text(&self) -> String {
        self.visible.concat()
    }

    /// The LM text.
    pub fn lm_text(&self) -> String {
        self.lm_chars.concat()
    }

    /// The printed text with every non-identity glyph shown as ``[lm/glyph]``.
    ///
    /// Elided glyphs render as ``[lm/]``; symbols are unescaped.
    pub fn text_with_substitutions(
        &self,
        chars: &CharIndexer,
    ) -> SCResult<String> {
        let mut out = String::new();
        for state in &self.states {
            let glyph = state.glyph;
            let glyph_symbol = charset::unescape_char(chars.object_of(glyph.template_char_index)?);
            if glyph.is_identity_of(state.lm_char) {
                out.push_str(&glyph_symbol);
            } else {
                let lm_symbol = charset::unescape_char(chars.object_of(state.lm_char)?);
                out.push('[');
                out.push_str(&lm_symbol);
                out.push('/');
                if !glyph.is_elided {
                    out.push_str(&glyph_symbol);
                }
                out.push(']');
            }
        }
        Ok(out)
    }

    /// One ``glyph[width]`` entry per kept state, newline separated.
    pub fn text_with_widths(
        &self,
        chars: &CharIndexer,
    ) -> SCResult<String> {
        let mut entries = Vec::with_capacity(self.states.len());
        for (state, width) in self.states.iter().zip(&self.widths) {
            let symbol = charset::unescape_char(chars.object_of(state.glyph.template_char_index)?);
            entries.push(format!("{symbol}[{width}]"));
        }
        Ok(entries.join("\n"))
    }
}

/// Consolidate the decoded lines of one document.
///
/// A state whose glyph template is the hyphen is dropped when the last
/// printed symbol is also a hyphen; the last printed symbol carries over
/// from the end of the previous line.
///
/// ## Arguments
/// * `decodes` - the lines, in order.
/// * `chars` - the indexer the decodes refer to.
pub fn consolidate_lines(
    decodes: &[LineDecode],
    chars: &CharIndexer,
) -> SCResult<Vec<TranscribedLine>> {
    let mut last_visible_is_hyphen = false;
    let mut lines = Vec::with_capacity(decodes.len());

    for decode in decodes {
        let mut line = TranscribedLine::default();
        for (state, &width) in decode.states.iter().zip(&decode.widths) {
            let glyph_symbol = chars.object_of(state.glyph.template_char_index)?;
            let is_hyphen = charset::is_hyphen(glyph_symbol);
            if last_visible_is_hyphen && is_hyphen {
                continue;
            }

            if state.glyph.is_visible() {
                line.visible.push(glyph_symbol.clone());
                last_visible_is_hyphen = is_hyphen;
            }
            line.lm_chars.push(chars.object_of(state.lm_char)?.clone());
            line.states.push(*state);
            line.widths.push(width);
        }
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GlyphChar;

    fn chars() -> CharIndexer {
        ["a", "b", "-", "\\~n"].iter().map(|s| s.to_string()).collect()
    }

    fn decode(steps: &[(usize, GlyphChar)]) -> LineDecode {
        let mut position = 0;
        let mut decode = LineDecode::empty();
        for &(lm_char, glyph) in steps {
            let width = if glyph.is_elided { 0 } else { 2 };
            decode.states.push(TransitionState {
                language: None,
                lm_char,
                glyph,
                position,
            });
            decode.widths.push(width);
            position += width;
        }
        decode
    }

    fn plain(text: &[usize]) -> LineDecode {
        decode(
            &text
                .iter()
                .map(|&c| (c, GlyphChar::normal(c)))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_hyphen_across_line_wrap() {
        let lines = consolidate_lines(&[plain(&[0, 1, 2]), plain(&[2, 0])], &chars()).unwrap();
        assert_eq!(lines[0].text(), "ab-");
        assert_eq!(lines[1].text(), "a");
        assert_eq!(lines[1].states.len(), 1);

        let hyphens = lines
            .iter()
            .map(|l| l.text().matches('-').count())
            .sum::<usize>();
        assert_eq!(hyphens, 1);
    }

    #[test]
    fn test_adjacent_hyphens_within_line() {
        let lines = consolidate_lines(&[plain(&[0, 2, 2, 2, 1])], &chars()).unwrap();
        assert_eq!(lines[0].text(), "a-b");
        assert_eq!(lines[0].lm_text(), "a-b");
        assert_eq!(lines[0].widths.len(), 3);
    }

    #[test]
    fn test_elided_glyphs_are_not_printed() {
        let line = decode(&[
            (0, GlyphChar::normal(0)),
            (1, GlyphChar::elided(1)),
            (3, GlyphChar::with_tilde(0)),
        ]);
        let lines = consolidate_lines(&[line], &chars()).unwrap();
        assert_eq!(lines[0].text(), "aa");
        assert_eq!(lines[0].lm_text(), "ab\\~n");
        assert_eq!(
            lines[0].text_with_substitutions(&chars()).unwrap(),
            "a[b/][n\u{0303}/a]"
        );
    }

    #[test]
    fn test_substitution_rendering() {
        let line = decode(&[
            (0, GlyphChar::normal(1)),
            (1, GlyphChar::normal(1)),
            (3, GlyphChar::normal(3)),
        ]);
        let lines = consolidate_lines(&[line], &chars()).unwrap();
        assert_eq!(
            lines[0].text_with_substitutions(&chars()).unwrap(),
            "[a/b]bn\u{0303}"
        );
        assert_eq!(
            lines[0].text_with_widths(&chars()).unwrap(),
            "b[2]\nb[2]\nn\u{0303}[2]"
        );
    }

    #[test]
    fn test_unknown_ids() {
        let line = plain(&[9]);
        assert!(consolidate_lines(&[line], &chars()).is_err());
    }
}
