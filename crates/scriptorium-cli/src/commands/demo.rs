use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufRead, BufReader},
    num::NonZeroUsize,
};

use scriptorium::{
    BasicGlyphSubstitutionModel,
    CharIndexer,
    DecoderOptions,
    Document,
    EStepMode,
    EmTrainer,
    EmTrainerOptions,
    GlyphChar,
    TrainingReport,
    GlyphSubstitutionModel,
    indexer::charset,
    output::consolidate_lines,
    persistence::save_model_path,
    testing::{BigramLanguageModel, SyntheticEmissionModel, SyntheticLine},
};

use crate::{logging::LogArgs, model_args::ModelArgs};

/// Args for the demo command.
#[derive(clap::Args, Debug)]
pub struct DemoArgs {
    /// Optional text file, one line per printed line; "-" or nothing reads stdin.
    #[clap(long, default_value = None)]
    input: Option<String>,

    /// Print one character with another's template, as ``FROM:TO``; may be repeated.
    #[arg(long = "substitute")]
    substitutions: Vec<String>,

    /// Template width in columns.
    #[arg(long, default_value = "2")]
    width: usize,

    /// EM iterations.
    #[arg(long, default_value = "3")]
    iterations: usize,

    /// Use hard (best path) counts instead of posteriors.
    #[arg(long)]
    viterbi: bool,

    /// Keep at most this many states per lattice layer.
    #[arg(long)]
    beam: Option<usize>,

    /// E-step threads; defaults to the ``rayon`` environment.
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    #[clap(flatten)]
    model: ModelArgs,

    /// Optional path to save the trained model.
    #[arg(long)]
    output: Option<String>,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl DemoArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let text = self.read_lines()?;
        let mut alphabet: BTreeSet<String> = text
            .iter()
            .flat_map(|line| line.chars().map(String::from))
            .collect();
        alphabet.insert(charset::HYPHEN.to_string());

        let corpus = text.join("\n");
        let lm = BigramLanguageModel::train(alphabet, &[("demo", corpus.as_str())], 0.0);

        let mut model = BasicGlyphSubstitutionModel::from_language_model(&lm, self.model.options())?
            .with_prior(self.model.prior())?;
        let chars = model.character_indexer().clone();

        let substitutions = self.parse_substitutions(&chars)?;
        let mut font = SyntheticEmissionModel::uniform_width(chars.len(), self.width);

        let mut lines = Vec::with_capacity(text.len());
        for line in &text {
            let glyphs = line
                .chars()
                .map(|c| {
                    let lm_char = chars.lookup(c.to_string().as_str())?;
                    let template = substitutions.get(&lm_char).copied().unwrap_or(lm_char);
                    Ok(GlyphChar::normal(template))
                })
                .collect::<scriptorium::SCResult<Vec<_>>>()?;
            lines.push(SyntheticLine::render_glyphs(&font, &glyphs));
        }
        let documents = vec![Document::new("demo", lines)];

        let e_step_mode = if self.viterbi {
            EStepMode::Viterbi
        } else {
            EStepMode::Posterior
        };
        let trainer = EmTrainer::new(
            EmTrainerOptions::default()
                .with_num_iterations(self.iterations)
                .with_e_step_mode(e_step_mode)
                .with_num_threads(self.threads)
                .with_decoder(DecoderOptions::default().with_beam_width(self.beam)),
        );

        let report = trainer.train(&mut model, &lm, &mut font, &documents, &mut ())?;
        log::info!("{}", training_outcome(&report));

        let decoded = trainer.decode_documents(&model, &lm, &font, &documents)?;
        for decodes in &decoded {
            for line in consolidate_lines(decodes, &chars)? {
                println!("{}", line.text_with_substitutions(&chars)?);
            }
        }

        if let Some(path) = &self.output {
            log::info!("output: {path}");
            save_model_path(&model, path)?;
        }

        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let reader: Box<dyn BufRead> = match self.input.as_deref() {
            None | Some("-") => Box::new(BufReader::new(std::io::stdin().lock())),
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
        };

        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn parse_substitutions(
        &self,
        chars: &CharIndexer,
    ) -> Result<BTreeMap<usize, usize>, Box<dyn std::error::Error>> {
        let mut substitutions = BTreeMap::new();
        for pair in &self.substitutions {
            let Some((from, to)) = pair.split_once(':') else {
                return Err(format!("expected FROM:TO, found {pair:?}").into());
            };
            substitutions.insert(chars.lookup(from)?, chars.lookup(to)?);
        }
        Ok(substitutions)
    }
}

/// One line describing a finished run; the trainer logs each iteration itself.
fn training_outcome(report: &TrainingReport) -> String {
    let last = report
        .iterations
        .last()
        .map(|summary| format!(", final log likelihood {:.4}", summary.log_likelihood))
        .unwrap_or_default();
    let converged = if report.converged { ", converged" } else { "" };
    format!("trained {} iterations{last}{converged}", report.iterations.len())
}
