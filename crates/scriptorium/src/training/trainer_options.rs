//! # Trainer Options

use core::num::NonZeroUsize;

use crate::{
    errors::{SCResult, ScriptoriumError},
    lattice::DecoderOptions,
};

/// How the E-step turns a line's lattice into statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EStepMode {
    /// Expected counts over all paths (forward-backward).
    #[default]
    Posterior,

    /// Unit counts along the best path ("hard" EM).
    Viterbi,
}

/// Options for [`crate::EmTrainer`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmTrainerOptions {
    /// The maximum number of EM iterations.
    pub num_iterations: usize,

    /// Stop once the log-likelihood improves by less than this.
    pub convergence_threshold: Option<f64>,

    /// The E-step mode.
    pub e_step_mode: EStepMode,

    /// The largest tolerated fraction of undecodable lines per iteration.
    pub max_failed_line_fraction: f64,

    /// Deliver best-path transcriptions to the sink every `n` iterations,
    /// and after the final one.
    pub materialize_every: Option<usize>,

    /// The E-step worker count; ``None`` uses the global ``rayon`` pool.
    pub num_threads: Option<NonZeroUsize>,

    /// Options for every line decoder.
    pub decoder: DecoderOptions,
}

impl Default for EmTrainerOptions {
    fn default() -> Self {
        Self {
            num_iterations: 3,
            convergence_threshold: None,
            e_step_mode: EStepMode::default(),
            max_failed_line_fraction: 0.1,
            materialize_every: None,
            num_threads: None,
            decoder: DecoderOptions::default(),
        }
    }
}

impl EmTrainerOptions {
    /// Sets the maximum number of iterations.
    pub fn with_num_iterations(
        self,
        num_iterations: usize,
    ) -> Self {
        Self {
            num_iterations,
            ..self
        }
    }

    /// Sets the convergence threshold.
    pub fn with_convergence_threshold(
        self,
        convergence_threshold: Option<f64>,
    ) -> Self {
        Self {
            convergence_threshold,
            ..self
        }
    }

    /// Sets the E-step mode.
    pub fn with_e_step_mode(
        self,
        e_step_mode: EStepMode,
    ) -> Self {
        Self {
            e_step_mode,
            ..self
        }
    }

    /// Sets the tolerated fraction of failed lines.
    pub fn with_max_failed_line_fraction(
        self,
        max_failed_line_fraction: f64,
    ) -> Self {
        Self {
            max_failed_line_fraction,
            ..self
        }
    }

    /// Sets the materialization interval.
    pub fn with_materialize_every(
        self,
        materialize_every: Option<usize>,
    ) -> Self {
        Self {
            materialize_every,
            ..self
        }
    }

    /// Sets the E-step worker count.
    pub fn with_num_threads(
        self,
        num_threads: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            num_threads,
            ..self
        }
    }

    /// Sets the decoder options.
    pub fn with_decoder(
        self,
        decoder: DecoderOptions,
    ) -> Self {
        Self { decoder, ..self }
    }

    /// Check the option values.
    pub fn validate(&self) -> SCResult<()> {
        if !(0.0..=1.0).contains(&self.max_failed_line_fraction) {
            return Err(ScriptoriumError::invalid_argument(
                "max_failed_line_fraction",
                "must be in [0, 1]",
            ));
        }
        if let Some(threshold) = self.convergence_threshold
            && (!threshold.is_finite() || threshold < 0.0)
        {
            return Err(ScriptoriumError::invalid_argument(
                "convergence_threshold",
                "must be >= 0",
            ));
        }
        if self.materialize_every == Some(0) {
            return Err(ScriptoriumError::invalid_argument(
                "materialize_every",
                "must be > 0",
            ));
        }
        self.decoder.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EmTrainerOptions::default();
        assert_eq!(options.num_iterations, 3);
        assert_eq!(options.e_step_mode, EStepMode::Posterior);
        assert_eq!(options.max_failed_line_fraction, 0.1);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let bad = [
            EmTrainerOptions::default().with_max_failed_line_fraction(1.5),
            EmTrainerOptions::default().with_max_failed_line_fraction(f64::NAN),
            EmTrainerOptions::default().with_convergence_threshold(Some(-1.0)),
            EmTrainerOptions::default().with_materialize_every(Some(0)),
            EmTrainerOptions::default()
                .with_decoder(DecoderOptions::default().with_beam_width(Some(0))),
        ];
        for options in bad {
            assert!(options.validate().is_err(), "{options:?}");
        }

        let good = EmTrainerOptions::default()
            .with_num_iterations(1)
            .with_convergence_threshold(Some(0.0))
            .with_e_step_mode(EStepMode::Viterbi)
            .with_materialize_every(Some(2))
            .with_num_threads(NonZeroUsize::new(2));
        assert!(good.validate().is_ok());
    }
}
