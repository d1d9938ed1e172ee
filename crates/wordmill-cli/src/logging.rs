use stderrlog::{LogLevelNum, Timestamp};

/// Stderr logging flags.
#[derive(clap::Args, Debug)]
pub struct Verbosity {
    /// Only report errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Raise verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Verbosity {
    /// Install the stderr logger. Training progress lands at info, which
    /// is the baseline level.
    pub fn init(&self) -> anyhow::Result<()> {
        let level = if self.quiet {
            LogLevelNum::Error
        } else {
            match self.verbose {
                0 => LogLevelNum::Info,
                1 => LogLevelNum::Debug,
                _ => LogLevelNum::Trace,
            }
        };

        stderrlog::new()
            .verbosity(level)
            .timestamp(Timestamp::Off)
            .init()?;

        Ok(())
    }
}
