use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shelf", about = "Shelf: a lending ledger for books", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this account (label or 0x address)
    #[arg(short, long, global = true)]
    pub account: Option<String>,

    /// JSON journal to restore from and save to
    #[arg(short, long, global = true)]
    pub journal: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the key a title resolves to
    Key(TitleArgs),
    /// Add copies of a book (owner only)
    Add(AddArgs),
    /// Borrow one copy of a book
    Borrow(BookArgs),
    /// Return a borrowed copy
    Return(BookArgs),
    /// List every book key in insertion order
    Keys(KeysArgs),
    /// List books with copies and borrowers
    Books(BooksArgs),
    /// Show who holds copies of a book
    Borrowers(BookArgs),
    /// Show ledger owner and journal summary
    Info,
    /// Verify the journal and replay it against the catalog
    Verify,
    /// Run the scripted add/borrow/return walk-through
    Interact,
}

#[derive(Args)]
pub struct TitleArgs {
    pub title: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(default_value = "1")]
    pub copies: u64,
}

#[derive(Args)]
pub struct BookArgs {
    /// Book key (0x...) or title
    pub book: String,
}

#[derive(Args)]
pub struct KeysArgs {
    /// Size the listing by key count instead of probing
    #[arg(long)]
    pub counted: bool,
}

#[derive(Args)]
pub struct BooksArgs {
    /// Only books with a copy on the shelf
    #[arg(long)]
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add() {
        let cli = Cli::try_parse_from(["shelf", "add", "Solidity 101", "3"]).unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.title, "Solidity 101");
            assert_eq!(args.copies, 3);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_add_default_copies() {
        let cli = Cli::try_parse_from(["shelf", "add", "Solidity 101"]).unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.copies, 1);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_add_rejects_negative_copies() {
        assert!(Cli::try_parse_from(["shelf", "add", "X", "-1"]).is_err());
    }

    #[test]
    fn parse_borrow_with_account() {
        let cli = Cli::try_parse_from(["shelf", "borrow", "0xabc", "--account", "alice"]).unwrap();
        assert_eq!(cli.account, Some("alice".into()));
        if let Command::Borrow(args) = cli.command {
            assert_eq!(args.book, "0xabc");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_books_available() {
        let cli = Cli::try_parse_from(["shelf", "books", "--available"]).unwrap();
        if let Command::Books(args) = cli.command {
            assert!(args.available);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_keys_counted() {
        let cli = Cli::try_parse_from(["shelf", "keys", "--counted"]).unwrap();
        assert!(matches!(cli.command, Command::Keys(KeysArgs { counted: true })));
    }

    #[test]
    fn parse_journal_and_config() {
        let cli = Cli::try_parse_from([
            "shelf",
            "-j",
            "shelf.json",
            "--config",
            "shelf.toml",
            "info",
        ])
        .unwrap();
        assert_eq!(cli.journal, Some(PathBuf::from("shelf.json")));
        assert_eq!(cli.config, Some(PathBuf::from("shelf.toml")));
        assert!(matches!(cli.command, Command::Info));
    }

    #[test]
    fn parse_verify_and_interact() {
        let cli = Cli::try_parse_from(["shelf", "verify"]).unwrap();
        assert!(matches!(cli.command, Command::Verify));
        let cli = Cli::try_parse_from(["shelf", "interact"]).unwrap();
        assert!(matches!(cli.command, Command::Interact));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["shelf", "--verbose", "keys"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["shelf", "--format", "json", "books"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
