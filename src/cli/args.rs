//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Prune extracted API documentation trees by visibility, docstrings and predicate expressions
#[derive(Parser, Debug)]
#[command(name = "docfilter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Project config file (default: ./docfilter.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter a tree file and print the surviving members
    Filter {
        /// Tree document (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        tree: PathBuf,

        /// Predicate per member, e.g. "not name.startswith('_') and default()"
        #[arg(short, long)]
        expression: Option<String>,

        /// Drop members without a docstring
        #[arg(long)]
        documented_only: bool,

        /// Keep `_private` members
        #[arg(long)]
        include_private: bool,

        /// Keep __path__, __annotations__, __name__ and __all__
        #[arg(long)]
        include_special: bool,
    },

    /// Run the configured pipeline and print output placements
    Run {
        /// Tree document (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        tree: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_filter_flags_when_parsing_then_populates_command() {
        let cli = Cli::try_parse_from([
            "docfilter",
            "-vv",
            "filter",
            "api.json",
            "--expression",
            "default()",
            "--documented-only",
            "--include-private",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Filter {
                tree,
                expression,
                documented_only,
                include_private,
                include_special,
            }) => {
                assert_eq!(tree, PathBuf::from("api.json"));
                assert_eq!(expression.as_deref(), Some("default()"));
                assert!(documented_only);
                assert!(include_private);
                assert!(!include_special);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_global_config_after_subcommand_when_parsing_then_accepted() {
        let cli = Cli::try_parse_from(["docfilter", "run", "api.toml", "--config", "x.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
