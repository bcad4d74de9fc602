use stderrlog::{LogLevelNum, Timestamp};

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[clap(short, long)]
    pub quiet: bool,

    /// Raise the log level (-v, -vv, -vvv); replaces the command's default.
    #[arg(short, long, action = clap::ArgAction::Count, default_value = None)]
    verbose: Option<u8>,

    /// Prefix log lines with a timestamp.
    #[clap(long)]
    pub ts: bool,
}

impl LogArgs {
    /// The log level for a command whose default verbosity is `default`.
    ///
    /// Training progress is logged at ``info``, skipped lines at ``warn``,
    /// per-line lattice sizes at ``debug``.
    fn level(
        &self,
        default: u8,
    ) -> LogLevelNum {
        let verbosity = match self.verbose {
            Some(count) if count > 0 => count,
            _ => default,
        };
        match verbosity {
            0 => LogLevelNum::Off,
            1 => LogLevelNum::Error,
            2 => LogLevelNum::Warn,
            3 => LogLevelNum::Info,
            4 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        }
    }

    /// Install ``stderrlog`` as the ``log`` backend.
    pub fn setup_logging(
        &self,
        default: u8,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let timestamp = if self.ts {
            Timestamp::Second
        } else {
            Timestamp::Off
        };

        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(self.level(default))
            .timestamp(timestamp)
            .init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct Wrapper {
        #[clap(flatten)]
        logging: LogArgs,
    }

    fn parse(args: &[&str]) -> LogArgs {
        Wrapper::parse_from(std::iter::once("test").chain(args.iter().copied())).logging
    }

    #[test]
    fn test_default_level() {
        let args = parse(&[]);
        assert!(matches!(args.level(3), LogLevelNum::Info));
        assert!(matches!(args.level(2), LogLevelNum::Warn));
        assert!(!args.quiet);
        assert!(!args.ts);
    }

    #[test]
    fn test_verbose_replaces_default() {
        assert!(matches!(parse(&["-v"]).level(3), LogLevelNum::Error));
        assert!(matches!(parse(&["-vvvv"]).level(2), LogLevelNum::Debug));
        assert!(matches!(parse(&["-vvvvvv"]).level(0), LogLevelNum::Trace));
    }

    #[test]
    fn test_flags() {
        let args = parse(&["--quiet", "--ts"]);
        assert!(args.quiet);
        assert!(args.ts);
    }
}
