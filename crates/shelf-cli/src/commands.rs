use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use shelf_ledger::LedgerEvent;
use shelf_sdk::{
    derive_key, strip_hex_prefix, BookKey, BookSummary, Receipt, SdkConfig, SdkResult,
    ShelfClient,
};

use crate::cli::*;

const RULE: &str = "----------";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let json = matches!(cli.format, OutputFormat::Json);
    if let Command::Key(args) = &cli.command {
        return cmd_key(&args.title, json);
    }

    let config = build_config(&cli)?;
    let client = ShelfClient::connect(config).context("failed to open ledger")?;

    let mutated = match cli.command {
        Command::Key(args) => cmd_key(&args.title, json).map(|_| false),
        Command::Add(args) => cmd_add(&client, &args, json).await.map(|_| true),
        Command::Borrow(args) => {
            let key = resolve_key(&args.book)?;
            let receipt = client.borrow_book(&key).await?;
            print_receipt(&receipt, json)?;
            Ok(true)
        }
        Command::Return(args) => {
            let key = resolve_key(&args.book)?;
            let receipt = client.return_book(&key).await?;
            print_receipt(&receipt, json)?;
            Ok(true)
        }
        Command::Keys(args) => cmd_keys(&client, &args, json).await.map(|_| false),
        Command::Books(args) => cmd_books(&client, &args, json).await.map(|_| false),
        Command::Borrowers(args) => cmd_borrowers(&client, &args, json).await.map(|_| false),
        Command::Info => cmd_info(&client, json).await.map(|_| false),
        Command::Verify => cmd_verify(&client, json).await.map(|_| false),
        Command::Interact => cmd_interact(&client).await.map(|_| true),
    }?;

    if mutated && client.persist().await? {
        tracing::debug!("journal saved");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<SdkConfig> {
    let mut config = match &cli.config {
        Some(path) => SdkConfig::load(path)?,
        None => SdkConfig::default(),
    };
    if let Some(account) = &cli.account {
        config.account = account.clone();
    }
    if let Some(journal) = &cli.journal {
        config.journal_path = Some(journal.clone());
    }
    Ok(config)
}

/// A `0x` argument is a key; anything else is a title.
fn resolve_key(arg: &str) -> anyhow::Result<BookKey> {
    if strip_hex_prefix(arg).is_some() {
        BookKey::from_hex(arg).with_context(|| format!("invalid book key {arg}"))
    } else {
        Ok(derive_key(arg))
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_receipt(receipt: &Receipt, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(receipt);
    }
    let headline = match receipt.event() {
        LedgerEvent::BookAdded { .. } => "Book added",
        LedgerEvent::BookUpdated { .. } => "Book updated",
        LedgerEvent::BookBorrowed { .. } => "Book borrowed",
        LedgerEvent::BookReturned { .. } => "Book returned",
    };
    println!("{} {}", "✓".green().bold(), headline);
    println!("  Submission: {}", receipt.submission.to_string().dimmed());
    println!(
        "  Entry: {} {}",
        format!("#{}", receipt.entry.seq).yellow(),
        receipt.entry.short_hash().dimmed()
    );
    match receipt.event() {
        LedgerEvent::BookAdded { key, title, copies }
        | LedgerEvent::BookUpdated { key, title, copies } => {
            println!("  Key: {}", key.to_hex().cyan());
            println!("  Title: {}", title.bold());
            println!("  Copies: {copies}");
        }
        LedgerEvent::BookBorrowed {
            key,
            borrower,
            remaining,
        } => {
            println!("  Key: {}", key.to_hex().cyan());
            println!("  Borrower: {borrower}");
            println!("  Copies left: {remaining}");
        }
        LedgerEvent::BookReturned {
            key,
            returner,
            copies,
        } => {
            println!("  Key: {}", key.to_hex().cyan());
            println!("  Returned by: {returner}");
            println!("  Copies: {copies}");
        }
    }
    Ok(())
}

fn print_book(book: &BookSummary) {
    let copies = if book.is_available() {
        book.copies.to_string().green()
    } else {
        book.copies.to_string().red()
    };
    println!("{}  {}", book.key.to_hex().cyan(), book.title.bold());
    println!("  copies: {copies}");
    for borrower in &book.borrowers {
        println!("  borrowed by {borrower}");
    }
}

fn cmd_key(title: &str, json: bool) -> anyhow::Result<()> {
    let key = derive_key(title);
    if json {
        return print_json(&key);
    }
    println!("{}", key.to_hex());
    Ok(())
}

async fn cmd_add(client: &ShelfClient, args: &AddArgs, json: bool) -> anyhow::Result<()> {
    let receipt = client.add_book(&args.title, args.copies).await?;
    print_receipt(&receipt, json)
}

async fn cmd_keys(client: &ShelfClient, args: &KeysArgs, json: bool) -> anyhow::Result<()> {
    let keys = if args.counted {
        client.all_keys_counted().await?
    } else {
        client.all_keys().await?
    };
    if json {
        return print_json(&keys);
    }
    println!("All books keys are: {}", keys.len().to_string().bold());
    for (index, key) in keys.iter().enumerate() {
        println!("  [{index}] {}", key.to_hex().cyan());
    }
    Ok(())
}

async fn cmd_books(client: &ShelfClient, args: &BooksArgs, json: bool) -> anyhow::Result<()> {
    let books = if args.available {
        client.available_books().await?
    } else {
        client.all_books().await?
    };
    if json {
        return print_json(&books);
    }
    if books.is_empty() {
        println!("No books.");
    }
    for book in &books {
        print_book(book);
    }
    Ok(())
}

async fn cmd_borrowers(client: &ShelfClient, args: &BookArgs, json: bool) -> anyhow::Result<()> {
    let key = resolve_key(&args.book)?;
    let borrowers = client.borrowers(&key).await?;
    if json {
        return print_json(&borrowers);
    }
    if borrowers.is_empty() {
        println!("Nobody holds {}.", key.to_hex().cyan());
    }
    for borrower in &borrowers {
        println!("{borrower}");
    }
    Ok(())
}

async fn cmd_info(client: &ShelfClient, json: bool) -> anyhow::Result<()> {
    let info = client.info().await?;
    if json {
        return print_json(&info);
    }
    let head = info
        .journal_head
        .map(hex::encode)
        .unwrap_or_else(|| "(empty)".into());
    println!("Network: {}", client.config().network.bold());
    println!("Account: {}", client.account());
    println!("The creator of the ledger is: {}", info.owner.to_string().yellow());
    println!("Books: {}", info.book_count);
    println!(
        "There are {} applied operations on this ledger ({} rejected this session).",
        info.applied_operations, info.rejected_operations
    );
    println!("Journal head: {}", head.dimmed());
    Ok(())
}

async fn cmd_verify(client: &ShelfClient, json: bool) -> anyhow::Result<()> {
    let report = client.audit().await?;
    if json {
        print_json(&report)?;
    } else {
        println!("{} Journal integrity verified", "✓".green().bold());
        println!("  Entries: {}", report.entries);
        println!("  Hash chain: {}", "valid".green());
        let replay = if report.converged {
            "matches catalog".green()
        } else {
            "DIVERGES from catalog".red().bold()
        };
        println!("  Replay: {replay}");
    }
    if !report.converged {
        anyhow::bail!("journal replay does not reproduce the catalog");
    }
    Ok(())
}

/// Print a rejection in place of the receipt; other failures propagate.
fn settle(result: SdkResult<Receipt>) -> anyhow::Result<Option<Receipt>> {
    match result {
        Ok(receipt) => Ok(Some(receipt)),
        Err(e) if e.rejection().is_some() => {
            println!("{}", e.to_string().red());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn print_availability(client: &ShelfClient, key: &BookKey) -> anyhow::Result<()> {
    let available = client.is_available(key).await?;
    println!("{RULE}");
    println!(
        "Book: {} is{} available for borrowing",
        key.to_hex().cyan(),
        if available { "" } else { " not" }
    );
    println!("{RULE}");
    Ok(())
}

async fn interact_add(client: &ShelfClient, title: &str, copies: u64) -> anyhow::Result<bool> {
    println!("{RULE}");
    let Some(receipt) = settle(client.add_book(title, copies).await)? else {
        println!("{RULE}");
        return Ok(false);
    };
    println!("Add Book submission: {}", receipt.submission.to_string().dimmed());
    println!("Book key: {}", receipt.event().key().to_hex().cyan());
    println!("Book title: {title}");
    println!("Book copies: {copies}");
    println!("{RULE}");
    Ok(true)
}

async fn cmd_interact(client: &ShelfClient) -> anyhow::Result<()> {
    let mut keys = client.all_keys().await?;
    println!("All books keys are: {}", keys.len());
    for key in &keys {
        println!("  {}", key.to_hex().cyan());
    }

    if keys.is_empty() {
        if interact_add(client, "Solidity 101", 1).await? {
            println!("Since there were no books, one has been added.");
        }
        keys = client.all_keys().await?;
    }
    let Some(first) = keys.first().copied() else {
        println!("{}", "No books to borrow.".yellow());
        return Ok(());
    };

    println!("{RULE}");
    println!("Borrowing book: {}", first.to_hex().cyan());
    if let Some(receipt) = settle(client.borrow_book(&first).await)? {
        println!("Borrow Book submission: {}", receipt.submission.to_string().dimmed());
        println!("{}", "Successfully borrowed the book!".green());
    }
    println!("{RULE}");

    if client.has_borrowed(&first).await? {
        println!("{RULE}");
        println!(
            "It is confirmed that account: \n{} has borrowed book: \n{}",
            client.account(),
            first.to_hex()
        );
        println!("{RULE}");
    }

    print_availability(client, &first).await?;

    println!("{RULE}");
    println!("Returning book: {}", first.to_hex().cyan());
    if let Some(receipt) = settle(client.return_book(&first).await)? {
        println!("Return Book submission: {}", receipt.submission.to_string().dimmed());
        println!("{}", "Successfully returned the book!".green());
    }
    println!("{RULE}");

    print_availability(client, &first).await?;

    interact_add(client, "Mastering Ethereum", 2).await?;

    for book in client.all_books().await? {
        print_book(&book);
    }
    Ok(())
}
