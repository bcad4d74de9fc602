//! # EM Trainer

use crate::{
    errors::{SCResult, ScriptoriumError},
    lattice::{EmissionModel, LanguageModel, LineDecode, LineDecoder, LineId, LineStatistics},
    substitution::BasicGlyphSubstitutionModel,
    training::{DecodeSink, Document, EStepMode, EmTrainerOptions},
};

/// One EM iteration's outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationSummary {
    /// The iteration, zero based.
    pub iteration: usize,

    /// Lines that contributed statistics.
    pub lines_succeeded: usize,

    /// Lines skipped as undecodable.
    pub lines_failed: usize,

    /// The summed log-likelihood of the succeeded lines.
    pub log_likelihood: f64,
}

/// The outcome of [`EmTrainer::train`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    /// One summary per completed iteration.
    pub iterations: Vec<IterationSummary>,

    /// Training stopped on the convergence threshold.
    pub converged: bool,
}

/// A line to decode.
type LineJob<'a, Line> = (LineId, &'a Line);

/// Expectation-Maximization over a corpus of documents.
#[derive(Debug, Clone, Default)]
pub struct EmTrainer {
    options: EmTrainerOptions,
}

impl EmTrainer {
    /// Create a trainer.
    pub fn new(options: EmTrainerOptions) -> Self {
        Self { options }
    }

    /// The trainer options.
    pub fn options(&self) -> &EmTrainerOptions {
        &self.options
    }

    /// Run EM.
    ///
    /// ## Arguments
    /// * `model` - the substitution model, re-estimated in place.
    /// * `lm` - the language model.
    /// * `emission` - the emission model, re-estimated in place.
    /// * `documents` - the training corpus.
    /// * `sink` - receives best-path transcriptions when materialization is enabled.
    ///
    /// ## Errors
    /// * [`ScriptoriumError::TooManyLineFailures`] if an iteration skips too many lines.
    /// * Any non line-local error from decoding or re-estimation.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn train<L, E, S>(
        &self,
        model: &mut BasicGlyphSubstitutionModel,
        lm: &L,
        emission: &mut E,
        documents: &[Document<E::Line>],
        sink: &mut S,
    ) -> SCResult<TrainingReport>
    where
        L: LanguageModel + ?Sized,
        E: EmissionModel,
        S: DecodeSink + ?Sized,
    {
        self.options.validate()?;

        let jobs = line_jobs(documents);
        let total_lines = jobs.len();
        log::info!(
            "training on {} documents, {total_lines} lines",
            documents.len()
        );

        let mut report = TrainingReport::default();
        let mut previous: Option<f64> = None;
        for iteration in 0..self.options.num_iterations {
            let (statistics, lines_succeeded, lines_failed) =
                self.e_step(model, lm, emission, &jobs)?;

            if lines_failed as f64 > self.options.max_failed_line_fraction * total_lines as f64 {
                return Err(ScriptoriumError::TooManyLineFailures {
                    iteration,
                    failed: lines_failed,
                    total: total_lines,
                });
            }

            let log_likelihood = statistics.log_likelihood;
            if let Some(previous) = previous
                && log_likelihood < previous
            {
                log::warn!(
                    "iteration {iteration}: log likelihood fell from {previous:.6} to {log_likelihood:.6}"
                );
            }

            model.absorb(&statistics.substitution);
            model.normalize()?;
            emission.reestimate(&statistics.glyphs)?;

            log::info!(
                "iteration {iteration}: log likelihood {log_likelihood:.6} ({lines_succeeded} lines, {lines_failed} skipped)"
            );
            report.iterations.push(IterationSummary {
                iteration,
                lines_succeeded,
                lines_failed,
                log_likelihood,
            });

            report.converged = match (self.options.convergence_threshold, previous) {
                (Some(threshold), Some(previous)) => log_likelihood - previous < threshold,
                _ => false,
            };
            let is_last = report.converged || iteration + 1 == self.options.num_iterations;

            if let Some(every) = self.options.materialize_every
                && ((iteration + 1) % every == 0 || is_last)
            {
                self.materialize(iteration, model, lm, emission, documents, sink)?;
            }

            if report.converged {
                log::info!("converged after {} iterations", iteration + 1);
                break;
            }
            previous = Some(log_likelihood);
        }

        Ok(report)
    }

    /// Best-path decode every line of every document.
    ///
    /// Undecodable lines are logged and returned as empty decodes.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn decode_documents<L, E>(
        &self,
        model: &BasicGlyphSubstitutionModel,
        lm: &L,
        emission: &E,
        documents: &[Document<E::Line>],
    ) -> SCResult<Vec<Vec<LineDecode>>>
    where
        L: LanguageModel + ?Sized,
        E: EmissionModel,
    {
        let jobs = line_jobs(documents);
        let decoder = LineDecoder::new(model, lm, emission, self.options.decoder.clone())?;
        let results = self.map_lines(&jobs, |_, line| decoder.decode_best_path(line))?;

        let mut decoded: Vec<Vec<LineDecode>> = documents
            .iter()
            .map(|doc| Vec::with_capacity(doc.len()))
            .collect();
        for ((line_id, _), result) in jobs.iter().zip(results) {
            let decode = match result {
                Ok(decode) => decode,
                Err(err) if err.is_line_local() => {
                    log::warn!("{line_id}: {err}");
                    LineDecode::empty()
                }
                Err(err) => return Err(err),
            };
            decoded[line_id.document].push(decode);
        }
        Ok(decoded)
    }

    fn materialize<L, E, S>(
        &self,
        iteration: usize,
        model: &BasicGlyphSubstitutionModel,
        lm: &L,
        emission: &E,
        documents: &[Document<E::Line>],
        sink: &mut S,
    ) -> SCResult<()>
    where
        L: LanguageModel + ?Sized,
        E: EmissionModel,
        S: DecodeSink + ?Sized,
    {
        let decoded = self.decode_documents(model, lm, emission, documents)?;
        for (document, decodes) in decoded.iter().enumerate() {
            sink.on_document_decoded(iteration, document, decodes)?;
        }
        Ok(())
    }

    /// Decode all lines and reduce their statistics in line order.
    ///
    /// ## Returns
    /// ``(statistics, lines succeeded, lines failed)``.
    fn e_step<L, E>(
        &self,
        model: &BasicGlyphSubstitutionModel,
        lm: &L,
        emission: &E,
        jobs: &[LineJob<'_, E::Line>],
    ) -> SCResult<(LineStatistics, usize, usize)>
    where
        L: LanguageModel + ?Sized,
        E: EmissionModel,
    {
        let decoder = LineDecoder::new(model, lm, emission, self.options.decoder.clone())?;
        let mode = self.options.e_step_mode;
        let results = self.map_lines(jobs, |line_id, line| match mode {
            EStepMode::Posterior => decoder.decode_posterior(line_id, line),
            EStepMode::Viterbi => decoder
                .decode_best_path(line)
                .map(|decode| LineStatistics::from_path(model, line_id, &decode)),
        })?;

        let mut total = LineStatistics::default();
        let mut succeeded = 0;
        let mut failed = 0;
        for ((line_id, _), result) in jobs.iter().zip(results) {
            match result {
                Ok(statistics) => {
                    total.merge(statistics);
                    succeeded += 1;
                }
                Err(err) if err.is_line_local() => {
                    log::warn!("skipping {line_id}: {err}");
                    failed += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok((total, succeeded, failed))
    }

    /// Map `f` over `jobs`, preserving order.
    fn map_lines<Line, T, F>(
        &self,
        jobs: &[LineJob<'_, Line>],
        f: F,
    ) -> SCResult<Vec<T>>
    where
        Line: Sync,
        T: Send,
        F: Fn(LineId, &Line) -> T + Sync,
    {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            let run = || {
                jobs.par_iter()
                    .map(|(line_id, line)| f(*line_id, *line))
                    .collect::<Vec<T>>()
            };
            match self.options.num_threads {
                None => Ok(run()),
                Some(requested) => {
                    let num_threads = crate::utility::threads::resolve_num_threads(Some(requested));
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(num_threads)
                        .build()
                        .map_err(|err| {
                            ScriptoriumError::invalid_argument("num_threads", err.to_string())
                        })?;
                    Ok(pool.install(run))
                }
            }
        }

        #[cfg(not(feature = "rayon"))]
        {
            Ok(jobs
                .iter()
                .map(|(line_id, line)| f(*line_id, *line))
                .collect())
        }
    }
}

/// Flatten documents into ``(line id, line)`` jobs in document/line order.
fn line_jobs<Line>(documents: &[Document<Line>]) -> Vec<LineJob<'_, Line>> {
    documents
        .iter()
        .enumerate()
        .flat_map(|(document, doc)| {
            doc.lines
                .iter()
                .enumerate()
                .map(move |(line, image)| (LineId::new(document, line), image))
        })
        .collect()
}
