use std::{error::Error, path::Path, process::exit};

use clap::Parser;

use pocketbook_rs::{
    recompute_balance,
    store::{JsonFileStore, Store},
};

/// A utility for rebuilding the account balance from the transactions in a store file.
///
/// The balance is set to the opening balance plus incoming minus outgoing amounts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON store file.
    #[arg(long)]
    store_path: String,

    /// The balance of the account before any of the transactions.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    opening_balance: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let store_path = Path::new(&args.store_path);

    if !store_path.is_file() {
        eprintln!("File does not exist at {store_path:#?}!");
        exit(1);
    }

    let store = Store::new(JsonFileStore::new(store_path));
    let (old_balance, new_balance) = store.with_store(|document| {
        let old_balance = document.account.balance;
        let new_balance = recompute_balance(args.opening_balance, &document.expenses);

        if !new_balance.is_finite() {
            return Err(pocketbook_rs::Error::Validation(format!(
                "recomputed balance {new_balance} is out of range"
            )));
        }

        document.account.balance = new_balance;

        Ok((old_balance, new_balance))
    })?;

    println!("Balance updated from {old_balance} to {new_balance}");

    Ok(())
}
