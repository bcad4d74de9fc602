//! # Synthetic Emission Model

use std::collections::BTreeMap;

use crate::{
    errors::SCResult,
    glyph::GlyphChar,
    lattice::{EmissionModel, GlyphStatistics},
    types::CharId,
};

/// The ground truth of one pixel column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntheticColumn {
    /// The template printed over this column.
    pub template_char_index: CharId,

    /// The template carries an elision tilde.
    pub has_elision_tilde: bool,
}

impl SyntheticColumn {
    fn matches(
        &self,
        glyph: &GlyphChar,
    ) -> bool {
        !glyph.is_elided
            && glyph.template_char_index == self.template_char_index
            && glyph.has_elision_tilde == self.has_elision_tilde
    }
}

/// A line of labelled columns; `None` columns are blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntheticLine {
    /// The columns, left to right.
    pub columns: Vec<Option<SyntheticColumn>>,
}

impl SyntheticLine {
    /// A blank line.
    pub fn blank(width: usize) -> Self {
        Self {
            columns: vec![None; width],
        }
    }

    /// Print each character's own template.
    pub fn render(
        font: &SyntheticEmissionModel,
        text: &[CharId],
    ) -> Self {
        let glyphs: Vec<GlyphChar> = text.iter().map(|&c| GlyphChar::normal(c)).collect();
        Self::render_glyphs(font, &glyphs)
    }

    /// Print the given glyphs; elided glyphs occupy no columns.
    pub fn render_glyphs(
        font: &SyntheticEmissionModel,
        glyphs: &[GlyphChar],
    ) -> Self {
        let mut columns = Vec::new();
        for glyph in glyphs.iter().filter(|g| g.is_visible()) {
            let column = SyntheticColumn {
                template_char_index: glyph.template_char_index,
                has_elision_tilde: glyph.has_elision_tilde,
            };
            columns.extend(core::iter::repeat_n(Some(column), font.width_of(glyph)));
        }
        Self { columns }
    }

    /// The line width.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// Scores each column of a span by whether its label matches the glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEmissionModel {
    widths: Vec<usize>,
    match_score: f64,
    mismatch_score: f64,
    reestimations: usize,
    width_counts: BTreeMap<(GlyphChar, usize), f64>,
}

impl SyntheticEmissionModel {
    /// A font where every template is `width` columns wide.
    pub fn uniform_width(
        num_chars: usize,
        width: usize,
    ) -> Self {
        Self::with_widths(vec![width; num_chars])
    }

    /// A font with a width per template.
    pub fn with_widths(widths: Vec<usize>) -> Self {
        Self {
            widths,
            match_score: -0.25,
            mismatch_score: -8.0,
            reestimations: 0,
            width_counts: BTreeMap::new(),
        }
    }

    /// Sets the per-column log scores.
    pub fn with_scores(
        self,
        match_score: f64,
        mismatch_score: f64,
    ) -> Self {
        Self {
            match_score,
            mismatch_score,
            ..self
        }
    }

    /// The per-column log score of a matching column.
    pub fn match_score(&self) -> f64 {
        self.match_score
    }

    /// The per-column log score of a mismatching column.
    pub fn mismatch_score(&self) -> f64 {
        self.mismatch_score
    }

    /// How often [`EmissionModel::reestimate`] was called.
    pub fn reestimations(&self) -> usize {
        self.reestimations
    }

    /// The width counts of the last re-estimation.
    pub fn last_width_counts(&self) -> &BTreeMap<(GlyphChar, usize), f64> {
        &self.width_counts
    }
}

impl EmissionModel for SyntheticEmissionModel {
    type Line = SyntheticLine;

    fn line_width(
        &self,
        line: &SyntheticLine,
    ) -> usize {
        line.width()
    }

    fn width_of(
        &self,
        glyph: &GlyphChar,
    ) -> usize {
        if glyph.is_elided {
            return 0;
        }
        self.widths
            .get(glyph.template_char_index)
            .copied()
            .unwrap_or(0)
    }

    fn emission_score(
        &self,
        line: &SyntheticLine,
        glyph: &GlyphChar,
        start: usize,
        width: usize,
    ) -> f64 {
        let end = (start + width).min(line.columns.len());
        line.columns[start.min(end)..end]
            .iter()
            .map(|column| match column {
                Some(column) if column.matches(glyph) => self.match_score,
                _ => self.mismatch_score,
            })
            .sum()
    }

    fn reestimate(
        &mut self,
        statistics: &GlyphStatistics,
    ) -> SCResult<()> {
        self.reestimations += 1;
        self.width_counts = statistics.width_counts.clone();
        Ok(())
    }
}
