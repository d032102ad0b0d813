use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::RunOptions;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "qadeck")]
#[command(author, version, about)]
#[command(long_about = "A step-by-step question and answer deck.\n\n\
    Write questions and answers in markdown and walk through them one reveal at a time.\n\
    Progress is remembered per deck and shared between open windows.\n\n\
    Examples:\n  \
    qadeck quiz.md                        Launch (fullscreen)\n  \
    qadeck quiz.md --windowed             Launch in a window\n  \
    qadeck quiz.md --presenter            Show the next question and a faint answer peek\n  \
    qadeck 'file:///home/me/quiz.md?presenter'\n  \
    qadeck state reset quiz.md            Start the deck over\n  \
    qadeck format                         Print the deck format reference")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present (a path or a file:// URI)
    pub deck: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Presenter mode: show one question ahead and faint unrevealed answers
    #[arg(long, global = false)]
    pub presenter: bool,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Directory for persisted progress (overrides config)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a deck and print a summary of its items
    Check {
        /// Deck file to check
        deck: String,
    },

    /// Inspect or reset persisted progress for a deck
    State {
        #[command(subcommand)]
        command: StateCommands,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the deck file format reference
    Format,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum StateCommands {
    /// Show the stored step and acknowledged questions
    Show {
        /// Deck file
        deck: String,
    },

    /// Forget progress so the deck starts from the beginning
    Reset {
        /// Deck file
        deck: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.presenter, state_dir)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// A deck argument: a plain path or a `file://` URI whose query may carry
/// a `presenter` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckArg {
    pub path: PathBuf,
    pub presenter: bool,
}

impl DeckArg {
    pub fn parse(raw: &str) -> Self {
        let Some(rest) = raw.strip_prefix("file://") else {
            return Self {
                path: PathBuf::from(raw),
                presenter: false,
            };
        };

        let rest = rest.split_once('#').map_or(rest, |(r, _)| r);
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let presenter = query.is_some_and(|q| {
            q.split('&')
                .any(|pair| pair.split('=').next() == Some("presenter"))
        });

        Self {
            path: PathBuf::from(path),
            presenter,
        }
    }

    /// Parse and make sure the file exists.
    pub fn resolve(raw: &str) -> anyhow::Result<Self> {
        let arg = Self::parse(raw);
        if !arg.path.exists() {
            anyhow::bail!("File not found: {}", arg.path.display());
        }
        Ok(arg)
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load_or_default();
        let state_root = match self.state_dir {
            Some(dir) => dir,
            None => config.state_root()?,
        };

        match self.command {
            Some(Commands::Check { deck }) => {
                crate::commands::check::run(&DeckArg::resolve(&deck)?.path)
            }
            Some(Commands::State { command }) => crate::commands::state::run(command, &state_root),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Format) => {
                crate::commands::format::run();
                Ok(())
            }
            Some(Commands::Version) => {
                println!("qadeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(deck) = self.deck {
                    let arg = DeckArg::resolve(&deck)?;
                    crate::app::run(RunOptions {
                        deck: arg.path,
                        presenter: self.presenter || arg.presenter || config.presenter(),
                        windowed: self.windowed || config.windowed(),
                        state_root,
                        theme: config.theme().map(str::to_string),
                    })
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plain_path() {
        let arg = DeckArg::parse("decks/quiz.md");
        assert_eq!(arg.path, PathBuf::from("decks/quiz.md"));
        assert!(!arg.presenter);
    }

    #[test]
    fn test_file_uri_with_presenter() {
        let arg = DeckArg::parse("file:///home/me/quiz.md?presenter");
        assert_eq!(arg.path, PathBuf::from("/home/me/quiz.md"));
        assert!(arg.presenter);

        let arg = DeckArg::parse("file:///q.md?lang=en&presenter=0");
        assert!(arg.presenter);
    }

    #[test]
    fn test_file_uri_without_presenter() {
        let arg = DeckArg::parse("file:///q.md?presenters=1#top");
        assert_eq!(arg.path, PathBuf::from("/q.md"));
        assert!(!arg.presenter);

        let arg = DeckArg::parse("file:///q.md#presenter");
        assert!(!arg.presenter);
    }

    #[test]
    fn test_presenter_flag() {
        let cli = Cli::try_parse_from(["qadeck", "quiz.md", "--presenter", "-vv"]).unwrap();
        assert!(cli.presenter);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.deck.as_deref(), Some("quiz.md"));
    }

    #[test]
    fn test_state_subcommand() {
        let cli = Cli::try_parse_from(["qadeck", "state", "reset", "quiz.md"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::State {
                command: StateCommands::Reset { .. }
            })
        ));
    }
}
