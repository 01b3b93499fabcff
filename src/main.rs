//! The `cyborg` command-line interface.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::{CommandFactory, Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use cyborg::{
    Error, db,
    models::{DEFAULT_CATEGORY, DatabaseID, Expense},
    report::monthly_totals,
    stores::{ExpenseStore, ExpenseUpdate, RowChange, UpdateOutcome, sqlite::SqliteExpenseStore},
    ui,
};

/// C.Y.B.O.R.G. - Cybernetic Yield & Budgetary Oversight Record Gadget.
#[derive(Parser)]
#[command(name = "cyborg", version, about, long_about = None)]
struct Cli {
    /// File path to the expense SQLite database.
    #[arg(long, default_value = "expenses.db", global = true)]
    db_path: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the expense database.
    Init,

    /// Add a new expense.
    Add {
        /// The amount of the expense.
        amount: f64,

        /// A brief description of the expense.
        description: String,

        /// The category of the expense.
        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,
    },

    /// Delete an expense by its ID.
    Delete {
        /// The ID of the expense to delete.
        id: DatabaseID,
    },

    /// Update fields of an existing expense.
    Update {
        /// The ID of the expense to update.
        id: DatabaseID,

        /// A new amount for the expense.
        #[arg(short, long)]
        amount: Option<f64>,

        /// A new description for the expense.
        #[arg(short, long)]
        description: Option<String>,

        /// A new category for the expense.
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Search expense descriptions for a keyword.
    Search {
        /// The keyword to look for (case-sensitive substring match).
        keyword: String,
    },

    /// Display a report of the current month's expenses.
    Report,

    /// List all expenses ever recorded.
    List,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    ui::splash();

    let Some(command) = cli.command else {
        Cli::command()
            .print_help()
            .expect("could not print help text");
        return;
    };

    if let Err(error) = run(command, &cli.db_path) {
        ui::error(&error.to_string());
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, db_path: &Path) -> Result<(), Error> {
    let connection = db::open(db_path)?;

    if let Commands::Init = command {
        return match db::initialize(&connection)? {
            db::InitOutcome::Created => {
                ui::success("C.Y.B.O.R.G. database initialized successfully.");
                Ok(())
            }
            db::InitOutcome::AlreadyInitialized => {
                ui::notice("Database already initialized.");
                Ok(())
            }
        };
    }

    let mut store = SqliteExpenseStore::new(Arc::new(Mutex::new(connection)));

    match command {
        Commands::Init => unreachable!("handled above"),
        Commands::Add {
            amount,
            description,
            category,
        } => {
            let expense = store.create(Expense::build(amount, &description).category(category))?;
            ui::success(&format!(
                "Logged: {} for '{}'",
                ui::format_amount(expense.amount()),
                expense.description()
            ));
            print_monthly_report(&store)
        }
        Commands::Delete { id } => {
            match store.delete(id)? {
                RowChange::Changed => ui::success(&format!("Deleted expense {id}.")),
                RowChange::NotFound => ui::notice(&format!("No expense with ID {id}.")),
            }
            print_all(&store)
        }
        Commands::Update {
            id,
            amount,
            description,
            category,
        } => {
            let fields = ExpenseUpdate {
                amount,
                description,
                category,
            };

            match store.update(id, fields)? {
                UpdateOutcome::Applied => ui::success(&format!("Updated expense {id}.")),
                UpdateOutcome::NoFields => ui::notice("No fields to update."),
                UpdateOutcome::NotFound => ui::notice(&format!("No expense with ID {id}.")),
            }
            print_all(&store)
        }
        Commands::Search { keyword } => print_search(&store, &keyword),
        Commands::Report => print_monthly_report(&store),
        Commands::List => print_all(&store),
    }
}

/// Print the current month's expenses with per-category totals.
fn print_monthly_report(store: &impl ExpenseStore) -> Result<(), Error> {
    let now = OffsetDateTime::now_utc();
    let expenses = store.get_monthly(now.month(), now.year())?;

    if expenses.is_empty() {
        ui::notice("No transactions recorded for this fiscal period.");
        return Ok(());
    }

    ui::header(&format!("Fiscal Report: {} {}", now.month(), now.year()));
    println!("{}", ui::expense_table(&expenses));

    let totals = monthly_totals(&expenses);
    ui::header("Category Summary");
    println!("{}", ui::summary_table(&totals));
    ui::total_line(totals.grand_total);

    Ok(())
}

/// Print every recorded expense, most recent first.
fn print_all(store: &impl ExpenseStore) -> Result<(), Error> {
    let expenses = store.get_all()?;

    if expenses.is_empty() {
        ui::notice("No transactions in the databanks.");
        return Ok(());
    }

    ui::header("Complete Transaction History");
    println!("{}", ui::expense_table(&expenses));

    Ok(())
}

/// Print the expenses whose description contains `keyword`.
fn print_search(store: &impl ExpenseStore, keyword: &str) -> Result<(), Error> {
    let expenses = store.search(keyword)?;

    if expenses.is_empty() {
        ui::notice(&format!("No transactions found matching '{keyword}'."));
        return Ok(());
    }

    ui::header(&format!("Search Results for '{keyword}'"));
    println!("{}", ui::expense_table(&expenses));

    Ok(())
}
