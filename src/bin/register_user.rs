use std::{
    error::Error,
    io::{self},
    process::exit,
};

use clap::Parser;

use pocketbook_rs::{
    PasswordHash, ValidatedPassword, register,
    store::{JsonFileStore, Store},
};

/// A utility for registering a user directly in a store file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON store file. It is created if it does not exist.
    #[arg(long)]
    store_path: String,

    /// The email of the new user.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let password = match get_new_password() {
        Some(password) => password,
        None => return Ok(()),
    };

    let store = Store::new(JsonFileStore::new(&args.store_path));
    match register(&store, &args.email, &password, PasswordHash::DEFAULT_COST) {
        Ok(user) => {
            println!("Registered {} with ID {}", user.email, user.id);
            Ok(())
        }
        Err(error) => {
            print_error(error);
            exit(1);
        }
    }
}

fn get_new_password() -> Option<String> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if let Err(error) = ValidatedPassword::new(&first_password) {
            print_error(error);
            continue;
        }

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        return Some(first_password);
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
