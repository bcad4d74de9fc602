//! # Decoder Options

use core::time::Duration;

use crate::errors::{SCResult, ScriptoriumError};

/// The largest accepted [`DecoderOptions::max_consecutive_elisions`].
///
/// Each elided glyph opens another lattice layer at the same position.
pub const MAX_ELISION_RUN: usize = 32;

/// Options for [`crate::LineDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderOptions {
    /// Keep at most this many states per pixel position.
    pub beam_width: Option<usize>,

    /// The longest run of consecutive elided glyphs; at most [`MAX_ELISION_RUN`].
    pub max_consecutive_elisions: usize,

    /// Abandon a line after expanding this many states.
    pub max_expansions: Option<usize>,

    /// Abandon a line after this much wall time.
    pub max_line_duration: Option<Duration>,

    /// Posterior glyph observations below this weight are not reported to
    /// the emission model. Substitution counts are unaffected.
    pub min_observation_weight: f64,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            beam_width: None,
            max_consecutive_elisions: 2,
            max_expansions: None,
            max_line_duration: None,
            min_observation_weight: 1e-3,
        }
    }
}

impl DecoderOptions {
    /// Sets the per-position beam width.
    pub fn with_beam_width(
        self,
        beam_width: Option<usize>,
    ) -> Self {
        Self { beam_width, ..self }
    }

    /// Sets the longest run of consecutive elisions.
    pub fn with_max_consecutive_elisions(
        self,
        max_consecutive_elisions: usize,
    ) -> Self {
        Self {
            max_consecutive_elisions,
            ..self
        }
    }

    /// Sets the per-line expansion budget.
    pub fn with_max_expansions(
        self,
        max_expansions: Option<usize>,
    ) -> Self {
        Self {
            max_expansions,
            ..self
        }
    }

    /// Sets the per-line time budget.
    pub fn with_max_line_duration(
        self,
        max_line_duration: Option<Duration>,
    ) -> Self {
        Self {
            max_line_duration,
            ..self
        }
    }

    /// Sets the minimum reported observation weight.
    pub fn with_min_observation_weight(
        self,
        min_observation_weight: f64,
    ) -> Self {
        Self {
            min_observation_weight,
            ..self
        }
    }

    /// Check the option values.
    pub fn validate(&self) -> SCResult<()> {
        if self.beam_width == Some(0) {
            return Err(ScriptoriumError::invalid_argument(
                "beam_width",
                "must be > 0",
            ));
        }
        if self.max_consecutive_elisions > MAX_ELISION_RUN {
            return Err(ScriptoriumError::invalid_argument(
                "max_consecutive_elisions",
                format!("must be <= {MAX_ELISION_RUN}"),
            ));
        }
        if !self.min_observation_weight.is_finite() || self.min_observation_weight < 0.0 {
            return Err(ScriptoriumError::invalid_argument(
                "min_observation_weight",
                "must be >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecoderOptions::default();
        assert_eq!(options.beam_width, None);
        assert_eq!(options.max_consecutive_elisions, 2);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let options = DecoderOptions::default()
            .with_beam_width(Some(0))
            .with_max_expansions(Some(10))
            .with_max_line_duration(Some(Duration::from_secs(1)));
        assert!(matches!(
            options.validate(),
            Err(ScriptoriumError::InvalidArgument {
                arg: "beam_width",
                ..
            })
        ));

        let options = DecoderOptions::default().with_min_observation_weight(-1.0);
        assert!(options.validate().is_err());

        let options = DecoderOptions::default().with_max_consecutive_elisions(usize::MAX);
        assert!(matches!(
            options.validate(),
            Err(ScriptoriumError::InvalidArgument {
                arg: "max_consecutive_elisions",
                ..
            })
        ));
        let options = DecoderOptions::default().with_max_consecutive_elisions(MAX_ELISION_RUN);
        assert!(options.validate().is_ok());

        let options = DecoderOptions::default()
            .with_beam_width(Some(4))
            .with_max_consecutive_elisions(0);
        assert!(options.validate().is_ok());
    }
}
