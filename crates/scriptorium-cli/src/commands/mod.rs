mod demo;
mod init;
mod inspect;

/// Subcommands for scriptorium
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create an untrained substitution model.
    Init(init::InitArgs),

    /// Describe a saved substitution model.
    Inspect(inspect::InspectArgs),

    /// Train on synthetic renderings of a text and print the transcription.
    Demo(demo::DemoArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Init(cmd) => cmd.run(),
            Commands::Inspect(cmd) => cmd.run(),
            Commands::Demo(cmd) => cmd.run(),
        }
    }
}
