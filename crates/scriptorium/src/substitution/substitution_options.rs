//! # Substitution Model Options

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SCResult, ScriptoriumError},
    glyph::{GlyphSpace, GlyphTypeScheme},
};

/// Options for [`crate::BasicGlyphSubstitutionModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionModelOptions {
    /// Allow glyphs other than the LM character's own template.
    ///
    /// When false the model is the identity.
    pub allow_glyph_substitution: bool,

    /// The additive smoothing pseudo-count ``alpha``.
    pub smoothing_count: f64,

    /// How glyphs are grouped for conditioning.
    pub glyph_type_scheme: GlyphTypeScheme,

    /// Allow an LM character to be elided.
    pub allow_elision: bool,

    /// Allow templates rendered with an elision tilde.
    pub allow_elision_tilde: bool,
}

impl Default for SubstitutionModelOptions {
    fn default() -> Self {
        Self {
            allow_glyph_substitution: true,
            smoothing_count: 0.01,
            glyph_type_scheme: GlyphTypeScheme::default(),
            allow_elision: false,
            allow_elision_tilde: false,
        }
    }
}

impl SubstitutionModelOptions {
    /// Sets whether non-identity glyphs are allowed.
    pub fn with_allow_glyph_substitution(
        self,
        allow_glyph_substitution: bool,
    ) -> Self {
        Self {
            allow_glyph_substitution,
            ..self
        }
    }

    /// Sets the smoothing pseudo-count.
    ///
    /// ## Arguments
    /// * `smoothing_count` - must be finite and ``>= 0``; checked by [`Self::validate`].
    pub fn with_smoothing_count(
        self,
        smoothing_count: f64,
    ) -> Self {
        Self {
            smoothing_count,
            ..self
        }
    }

    /// Sets the glyph type scheme.
    pub fn with_glyph_type_scheme(
        self,
        glyph_type_scheme: GlyphTypeScheme,
    ) -> Self {
        Self {
            glyph_type_scheme,
            ..self
        }
    }

    /// Sets whether elided glyphs are allowed.
    pub fn with_allow_elision(
        self,
        allow_elision: bool,
    ) -> Self {
        Self {
            allow_elision,
            ..self
        }
    }

    /// Sets whether elision-tilde glyphs are allowed.
    pub fn with_allow_elision_tilde(
        self,
        allow_elision_tilde: bool,
    ) -> Self {
        Self {
            allow_elision_tilde,
            ..self
        }
    }

    /// Check the option values.
    pub fn validate(&self) -> SCResult<()> {
        if !self.smoothing_count.is_finite() || self.smoothing_count < 0.0 {
            return Err(ScriptoriumError::invalid_argument(
                "smoothing_count",
                "must be >= 0",
            ));
        }
        Ok(())
    }

    /// The glyph space these options describe over `num_chars` characters.
    pub fn glyph_space(
        &self,
        num_chars: usize,
    ) -> GlyphSpace {
        GlyphSpace::new(num_chars)
            .with_elision(self.allow_elision)
            .with_elision_tilde(self.allow_elision_tilde)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SubstitutionModelOptions::default();
        assert!(options.allow_glyph_substitution);
        assert_eq!(options.smoothing_count, 0.01);
        assert_eq!(options.glyph_type_scheme, GlyphTypeScheme::Elision);
        assert!(options.validate().is_ok());
        assert_eq!(options.glyph_space(4).len(), 4);
    }

    #[test]
    fn test_builders() {
        let options = SubstitutionModelOptions::default()
            .with_allow_glyph_substitution(false)
            .with_smoothing_count(0.5)
            .with_glyph_type_scheme(GlyphTypeScheme::Flat)
            .with_allow_elision(true)
            .with_allow_elision_tilde(true);

        assert!(!options.allow_glyph_substitution);
        assert_eq!(options.smoothing_count, 0.5);
        assert_eq!(options.glyph_type_scheme, GlyphTypeScheme::Flat);
        assert_eq!(options.glyph_space(4).len(), 9);
    }

    #[test]
    fn test_validate() {
        let zero = SubstitutionModelOptions::default().with_smoothing_count(0.0);
        assert!(zero.validate().is_ok());

        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let options = SubstitutionModelOptions::default().with_smoothing_count(bad);
            assert!(matches!(
                options.validate(),
                Err(ScriptoriumError::InvalidArgument {
                    arg: "smoothing_count",
                    ..
                })
            ));
        }
    }
}
