use std::io::{BufRead, BufReader};

use scriptorium::{
    BasicGlyphSubstitutionModel,
    CharIndexer,
    LanguageIndexer,
    persistence::save_model_path,
};

use crate::{logging::LogArgs, model_args::ModelArgs};

/// Args for the init command.
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Alphabet file; one symbol per line, escapes allowed.
    #[arg(long)]
    alphabet: String,

    /// Language name; may be repeated.
    #[arg(long = "language")]
    languages: Vec<String>,

    #[clap(flatten)]
    model: ModelArgs,

    /// Where to write the model.
    #[arg(long)]
    output: String,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl InitArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let chars = read_alphabet(&self.alphabet)?;
        log::info!("alphabet: {} symbols", chars.len());

        let languages: LanguageIndexer = self.languages.iter().cloned().collect();
        let model = BasicGlyphSubstitutionModel::new(
            chars,
            languages,
            self.model.options(),
            self.model.prior(),
        )?;

        log::info!("output: {}", self.output);
        save_model_path(&model, &self.output)?;
        println!("{}", model.summary());

        Ok(())
    }
}

/// Read one symbol per line; empty lines are skipped.
fn read_alphabet(path: &str) -> Result<CharIndexer, Box<dyn std::error::Error>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut chars = CharIndexer::new();
    for line in reader.lines() {
        let line = line?;
        let symbol = line.trim_end_matches('\r');
        if !symbol.is_empty() {
            chars.index_of(symbol)?;
        }
    }
    Ok(chars)
}
