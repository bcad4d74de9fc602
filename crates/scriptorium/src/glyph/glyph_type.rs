//! # Glyph Conditioning Categories

use serde::{Deserialize, Serialize};

use crate::{glyph::GlyphChar, types::CharId};

/// The coarse category of a glyph used to condition the next substitution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum GlyphType {
    /// A plainly rendered template; also the line-start category.
    #[default]
    Normal,

    /// A template rendered with an elision tilde.
    ElisionTilde,

    /// An elided glyph.
    Elided,

    /// A visible hyphen.
    Hyphen,
}

/// How glyphs collapse into [`GlyphType`] categories.
///
/// The scheme fixes the cardinality of the ``prev_glyph_type`` axis of the
/// substitution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GlyphTypeScheme {
    /// Every glyph is [`GlyphType::Normal`].
    Flat,

    /// [`GlyphType::Normal`], [`GlyphType::ElisionTilde`], [`GlyphType::Elided`].
    #[default]
    Elision,

    /// [`GlyphTypeScheme::Elision`] plus [`GlyphType::Hyphen`] for visible hyphens.
    ElisionAndHyphen,
}

impl GlyphTypeScheme {
    /// The categories this scheme can produce.
    pub fn types(&self) -> &'static [GlyphType] {
        match self {
            Self::Flat => &[GlyphType::Normal],
            Self::Elision => &[GlyphType::Normal, GlyphType::ElisionTilde, GlyphType::Elided],
            Self::ElisionAndHyphen => &[
                GlyphType::Normal,
                GlyphType::ElisionTilde,
                GlyphType::Elided,
                GlyphType::Hyphen,
            ],
        }
    }

    /// The number of categories.
    pub fn num_types(&self) -> usize {
        self.types().len()
    }

    /// Classify a glyph.
    ///
    /// ## Arguments
    /// * `glyph` - the glyph to classify.
    /// * `hyphen` - the hyphen's character id, if the alphabet has one.
    pub fn classify(
        &self,
        glyph: &GlyphChar,
        hyphen: Option<CharId>,
    ) -> GlyphType {
        match self {
            Self::Flat => GlyphType::Normal,
            Self::Elision | Self::ElisionAndHyphen => {
                if glyph.is_elided {
                    GlyphType::Elided
                } else if glyph.has_elision_tilde {
                    GlyphType::ElisionTilde
                } else if *self == Self::ElisionAndHyphen
                    && Some(glyph.template_char_index) == hyphen
                {
                    GlyphType::Hyphen
                } else {
                    GlyphType::Normal
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat() {
        let scheme = GlyphTypeScheme::Flat;
        assert_eq!(scheme.num_types(), 1);
        assert_eq!(
            scheme.classify(&GlyphChar::elided(0), None),
            GlyphType::Normal
        );
    }

    #[test]
    fn test_elision() {
        let scheme = GlyphTypeScheme::default();
        assert_eq!(scheme, GlyphTypeScheme::Elision);
        assert_eq!(scheme.num_types(), 3);

        let hyphen = Some(2);
        assert_eq!(scheme.classify(&GlyphChar::normal(0), hyphen), GlyphType::Normal);
        assert_eq!(scheme.classify(&GlyphChar::normal(2), hyphen), GlyphType::Normal);
        assert_eq!(
            scheme.classify(&GlyphChar::with_tilde(0), hyphen),
            GlyphType::ElisionTilde
        );
        assert_eq!(scheme.classify(&GlyphChar::elided(0), hyphen), GlyphType::Elided);
    }

    #[test]
    fn test_elision_and_hyphen() {
        let scheme = GlyphTypeScheme::ElisionAndHyphen;
        assert_eq!(scheme.num_types(), 4);

        let hyphen = Some(2);
        assert_eq!(scheme.classify(&GlyphChar::normal(2), hyphen), GlyphType::Hyphen);
        assert_eq!(scheme.classify(&GlyphChar::elided(2), hyphen), GlyphType::Elided);
        assert_eq!(scheme.classify(&GlyphChar::normal(2), None), GlyphType::Normal);
    }
}
