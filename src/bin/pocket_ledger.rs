use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

use pocket_ledger::{
    Category, CategoryName, DEFAULT_DB_PATH, LedgerConfig, LedgerStore, NewTransaction, Summary,
    SummaryAggregator, SummaryPolicy, Transaction, TransactionId, TransactionType, parse_date,
};

/// Record income and expenses and see where your money goes.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the ledger SQLite database. Created if it does not exist.
    #[arg(long, env = "POCKET_LEDGER_DB", default_value = DEFAULT_DB_PATH)]
    db_path: PathBuf,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Fail instead of showing zero totals when the summary cannot be read.
    #[arg(long, global = true)]
    strict_summary: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new transaction.
    Add(AddArgs),
    /// List all transactions, most recent first.
    List,
    /// Show a single transaction.
    Show {
        /// The ID of the transaction.
        id: TransactionId,
    },
    /// Change a transaction. Fields that are not given keep their current value.
    Edit(EditArgs),
    /// Delete a transaction.
    Delete {
        /// The ID of the transaction.
        id: TransactionId,
    },
    /// Add a category.
    AddCategory {
        /// The name of the category, must be unique.
        name: CategoryName,

        /// Whether the category groups `Income` or `Expense` transactions.
        #[arg(long = "type")]
        kind: TransactionType,
    },
    /// List categories.
    Categories {
        /// Only show categories of this type.
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    /// Show total income, total expense and the net balance.
    Summary,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// The amount of money, without a sign.
    #[arg(long)]
    amount: f64,

    /// `Income` or `Expense`.
    #[arg(long = "type")]
    kind: TransactionType,

    /// The date in the format YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<Date>,

    /// What the transaction was for.
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// The ID of the transaction.
    id: TransactionId,

    /// The new amount.
    #[arg(long)]
    amount: Option<f64>,

    /// The new type, `Income` or `Expense`.
    #[arg(long = "type")]
    kind: Option<TransactionType>,

    /// The new date in the format YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    date: Option<Date>,

    /// The new description.
    #[arg(long)]
    description: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let summary_policy = if cli.strict_summary {
        SummaryPolicy::Propagate
    } else {
        SummaryPolicy::FailSoft
    };
    let config = LedgerConfig::default()
        .with_db_path(&cli.db_path)
        .with_summary_policy(summary_policy);
    let store = LedgerStore::open(config)?;
    let output = Output { json: cli.json };

    match cli.command {
        Command::Add(args) => {
            let new_transaction = NewTransaction::new(
                args.date.unwrap_or_else(today),
                &args.description,
                args.amount,
                args.kind,
            );
            let id = store.add_transaction(&new_transaction)?;
            output.message(&format!("Transaction {id} added."));
        }
        Command::List => output.transactions(&store.get_all_transactions()?)?,
        Command::Show { id } => match store.get_transaction_by_id(id)? {
            Some(transaction) => output.transactions(&[transaction])?,
            None => return Err(format!("no transaction with the ID {id}").into()),
        },
        Command::Edit(args) => {
            let Some(current) = store.get_transaction_by_id(args.id)? else {
                return Err(format!("no transaction with the ID {}", args.id).into());
            };
            let new_transaction = NewTransaction::new(
                args.date.unwrap_or(current.date),
                args.description.as_deref().unwrap_or(&current.description),
                args.amount.unwrap_or(current.amount),
                args.kind.unwrap_or(current.kind),
            );
            store.update_transaction(args.id, &new_transaction)?;
            output.message(&format!("Transaction {} updated.", args.id));
        }
        Command::Delete { id } => {
            store.delete_transaction(id)?;
            output.message(&format!("Transaction {id} deleted."));
        }
        Command::AddCategory { name, kind } => {
            let display_name = name.to_string();
            store.add_category(name, kind)?;
            output.message(&format!("Category '{display_name}' added."));
        }
        Command::Categories { kind } => output.categories(&store.get_categories(kind)?)?,
        Command::Summary => {
            let summary = SummaryAggregator::new(&store).summarize()?;
            output.summary(&summary)?;
        }
    }

    Ok(())
}

struct Output {
    json: bool,
}

impl Output {
    fn message(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "message": message }));
        } else {
            println!("{message}");
        }
    }

    fn transactions(&self, transactions: &[Transaction]) -> Result<(), serde_json::Error> {
        if self.json {
            return print_json(&transactions);
        }

        if transactions.is_empty() {
            println!("No transactions.");
            return Ok(());
        }

        println!(
            "{:>5}  {:<10}  {:<7}  {:>12}  Description",
            "ID", "Date", "Type", "Amount"
        );
        for transaction in transactions {
            println!(
                "{:>5}  {:<10}  {:<7}  {:>12.2}  {}",
                transaction.id,
                transaction.date,
                transaction.kind,
                transaction.amount,
                transaction.description
            );
        }

        Ok(())
    }

    fn categories(&self, categories: &[Category]) -> Result<(), serde_json::Error> {
        if self.json {
            return print_json(&categories);
        }

        if categories.is_empty() {
            println!("No categories.");
            return Ok(());
        }

        for category in categories {
            println!("{:>5}  {:<7}  {}", category.id, category.kind, category.name);
        }

        Ok(())
    }

    fn summary(&self, summary: &Summary) -> Result<(), serde_json::Error> {
        if self.json {
            return print_json(summary);
        }

        if summary.degraded {
            print_error("the ledger could not be read, totals are shown as zero");
        }

        println!("Income:  {:>12.2}", summary.total_income);
        println!("Expense: {:>12.2}", summary.total_expense);
        println!("Net:     {:>12.2}", summary.net_balance);

        Ok(())
    }
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

fn setup_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
