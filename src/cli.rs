// Command-line interface for the `liftkey` binary

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LiftKey card vault.
///
/// Store NFC card identifiers, merge their floor access into one card, and
/// present a card for use at a reader. Runs the terminal UI when no
/// subcommand is given.
#[derive(Parser, Debug)]
#[command(name = "liftkey", version, about = "LiftKey card vault", propagate_version = true)]
pub struct LiftKeyCli {
    /// Path to the vault database
    #[arg(long, short = 'd', global = true, env = "LIFTKEY_DB")]
    pub db: Option<PathBuf>,

    /// Platform to behave as: ios, android, desktop
    #[arg(long, global = true, env = "LIFTKEY_PLATFORM")]
    pub platform: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the terminal UI (default)
    Ui(UiArgs),
    /// List all cards in the vault
    List,
    /// Add a card from an identifier
    Add(AddArgs),
    /// Delete a card (by id or unique id prefix)
    Remove {
        id: String,
    },
    /// Merge two or more cards into a new one
    Merge(MergeArgs),
    /// Present a card and print its export text
    Show {
        id: String,
    },
    /// Print the URL a platform automation should open after reading a tag
    ShortcutUrl,
}

#[derive(Parser, Debug, Default)]
pub struct UiArgs {
    /// Identifier delivered by a platform automation
    #[arg(long)]
    pub uid: Option<String>,

    /// Launch URL carrying `?uid=...`
    #[arg(long)]
    pub bridge_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Card identifier (serial number)
    #[arg(long)]
    pub uid: String,

    /// Display name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Comma-separated floors, e.g. "1, 3, 5"
    #[arg(long, default_value = "")]
    pub floors: String,
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Ids (or unique id prefixes) of the cards to merge
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Name of the merged card
    #[arg(long)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        LiftKeyCli::command().debug_assert();
    }

    #[test]
    fn parse_merge_args() {
        let cli = LiftKeyCli::parse_from(["liftkey", "merge", "abc", "def", "--name", "Combo"]);
        match cli.command {
            Some(Commands::Merge(args)) => {
                assert_eq!(args.ids, vec!["abc", "def"]);
                assert_eq!(args.name.as_deref(), Some("Combo"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_means_ui() {
        let cli = LiftKeyCli::parse_from(["liftkey"]);
        assert!(cli.command.is_none());
    }
}
