use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use time::{Duration, OffsetDateTime};

use pocketbook_rs::{
    Account, DEMO_USER_EMAIL, DEMO_USER_PASSWORD, Direction, PasswordHash, Transaction,
    create_transaction, seed_demo_user,
    store::{JsonFileStore, Store},
};

/// A utility for creating a store file with demo data for manual testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the JSON store file to.
    #[arg(long, short)]
    output_path: String,
}

const OPENING_BALANCE: f64 = 78_160.0;

/// Kind, amount, direction, location and age in days of each sample transaction.
const SAMPLE_TRANSACTIONS: [(&str, f64, Direction, &str, i64); 5] = [
    ("Salary", 42_000.0, Direction::In, "Employer", 14),
    ("Rent", 12_500.0, Direction::Out, "Landlord", 12),
    ("Groceries", 1_840.5, Direction::Out, "Silpo", 6),
    ("Transport", 320.0, Direction::Out, "Metro", 3),
    ("Cashback", 150.0, Direction::In, "MyBank", 1),
];

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'data.json').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'data.json').");
            exit(1);
        }
        _ => {}
    }

    if output_path.exists() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating store file at {output_path:#?}");
    let store = Store::new(JsonFileStore::new(output_path));

    println!("Creating demo user...");
    seed_demo_user(&store, PasswordHash::DEFAULT_COST)?;

    println!("Creating account and transactions...");
    let now = OffsetDateTime::now_utc();
    let count = store.with_store(|document| {
        document.account = Account {
            balance: OPENING_BALANCE,
            owner: "Demo Owner".to_owned(),
            bank: "MyBank".to_owned(),
            country: "Ukraine".to_owned(),
        };

        for (kind, amount, direction, location, age_days) in SAMPLE_TRANSACTIONS {
            let builder = Transaction::build(kind, amount, location)
                .direction(Some(direction))
                .date(Some(now - Duration::days(age_days)));
            create_transaction(builder, now, document)?;
        }

        Ok(document.expenses.len())
    })?;

    println!("Created {count} transactions.");
    println!("Log in with {DEMO_USER_EMAIL} / {DEMO_USER_PASSWORD}");
    println!("Success!");

    Ok(())
}
