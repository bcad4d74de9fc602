use scriptorium::{
    GlyphSubstitutionModel,
    indexer::charset,
    persistence::load_model_path,
};

use crate::logging::LogArgs;

/// Args for the inspect command.
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// The model file.
    model: String,

    /// Print the most likely glyphs of every trained context.
    #[arg(long)]
    contexts: bool,

    /// Glyphs shown per context.
    #[arg(long, default_value = "3")]
    top: usize,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl InspectArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        let model = load_model_path(&self.model)?;
        println!("{}", model.summary());

        if !self.contexts {
            return Ok(());
        }

        let chars = model.character_indexer();
        let languages = model.language_indexer();
        let space = model.glyph_space();
        for (context, probs) in model.trained_contexts() {
            let language = match context.language {
                Some(id) => languages.object_of(id)?.as_str(),
                None => "*",
            };
            let prev = match context.prev_lm_char {
                Some(id) => charset::unescape_char(chars.object_of(id)?),
                None => "^".to_string(),
            };
            let lm = charset::unescape_char(chars.object_of(context.lm_char)?);
            println!(
                "[{language}] {prev:?} {:?} -> {lm:?}",
                context.prev_glyph_type
            );

            let mut ranked: Vec<_> = space
                .candidates(context.lm_char)
                .filter_map(|glyph| {
                    let id = space.glyph_id(context.lm_char, &glyph)?;
                    probs.get(id).map(|&p| (glyph, p))
                })
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (glyph, p) in ranked.into_iter().take(self.top) {
                let symbol = charset::unescape_char(chars.object_of(glyph.template_char_index)?);
                let shown = if glyph.is_elided {
                    "<elided>".to_string()
                } else if glyph.has_elision_tilde {
                    format!("{symbol}~")
                } else {
                    symbol
                };
                println!("    {p:>10.6}  {shown}");
            }
        }

        Ok(())
    }
}
