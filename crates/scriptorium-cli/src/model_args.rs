use scriptorium::{GlyphTypeScheme, SubstitutionModelOptions, SubstitutionPrior};

/// Glyph type schemes selectable on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemeArg {
    /// One category.
    Flat,

    /// Normal, elision tilde, elided.
    Elision,

    /// Elision categories plus visible hyphens.
    ElisionAndHyphen,
}

impl From<SchemeArg> for GlyphTypeScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Flat => GlyphTypeScheme::Flat,
            SchemeArg::Elision => GlyphTypeScheme::Elision,
            SchemeArg::ElisionAndHyphen => GlyphTypeScheme::ElisionAndHyphen,
        }
    }
}

/// Substitution model argument group.
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Only allow each character to print as itself.
    #[arg(long)]
    no_substitution: bool,

    /// Pseudo-count added to every glyph of every context.
    #[arg(long, default_value = "0.01")]
    smoothing: f64,

    /// Extra pseudo-count on each character's own glyph.
    #[arg(long, default_value = "0.0")]
    identity_prior: f64,

    /// Allow characters to be elided.
    #[arg(long)]
    elision: bool,

    /// Allow templates printed with an elision tilde.
    #[arg(long)]
    elision_tilde: bool,

    /// How the previous glyph is categorized.
    #[arg(long, value_enum, default_value = "elision")]
    scheme: SchemeArg,
}

impl ModelArgs {
    /// The model options.
    pub fn options(&self) -> SubstitutionModelOptions {
        SubstitutionModelOptions::default()
            .with_allow_glyph_substitution(!self.no_substitution)
            .with_smoothing_count(self.smoothing)
            .with_allow_elision(self.elision)
            .with_allow_elision_tilde(self.elision_tilde)
            .with_glyph_type_scheme(self.scheme.into())
    }

    /// The prior.
    pub fn prior(&self) -> SubstitutionPrior {
        SubstitutionPrior::identity_biased(self.identity_prior)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct Wrapper {
        #[clap(flatten)]
        model: ModelArgs,
    }

    #[test]
    fn test_defaults_match_library() {
        let args = Wrapper::parse_from(["test"]).model;
        assert_eq!(args.options(), SubstitutionModelOptions::default());
        assert_eq!(args.prior(), SubstitutionPrior::identity_biased(0.0));
    }

    #[test]
    fn test_flags() {
        let args = Wrapper::parse_from([
            "test",
            "--no-substitution",
            "--smoothing",
            "0.5",
            "--elision",
            "--scheme",
            "elision-and-hyphen",
            "--identity-prior",
            "2",
        ])
        .model;

        let options = args.options();
        assert!(!options.allow_glyph_substitution);
        assert_eq!(options.smoothing_count, 0.5);
        assert!(options.allow_elision);
        assert!(!options.allow_elision_tilde);
        assert_eq!(options.glyph_type_scheme, GlyphTypeScheme::ElisionAndHyphen);
        assert_eq!(args.prior().identity_pseudo_count, 2.0);
    }
}
