use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use petty_cash::{
    CategoryName, NewCategory, NewTopUp, NewUser, PasswordHash, Role, ValidatedPassword,
    create_category, create_user, initialize_db, record_top_up, set_shared_password,
};

/// A utility for creating a test database for the REST API server of petty_cash.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Setting the shared password to \"test\"...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    set_shared_password(&password_hash, &conn)?;

    println!("Creating test users...");
    let users = [
        ("admin@example.com", "Ada", "Admin", Role::Admin, "Finance"),
        ("manager@example.com", "Max", "Manager", Role::Manager, "Operations"),
        ("staff@example.com", "Sam", "Staff", Role::Staff, "Operations"),
    ];

    let mut staff = None;
    for (email, first_name, last_name, role, department) in users {
        let user = create_user(
            NewUser {
                email: email.to_owned(),
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                role,
                department: department.to_owned(),
            },
            &conn,
        )?;

        if role == Role::Staff {
            staff = Some(user);
        }
    }

    println!("Creating categories...");
    let categories = [
        ("Office Supplies", "Stationery, printer paper and ink"),
        ("Travel", "Taxis, parking and public transport"),
        ("Meals", "Team lunches and client meals"),
        ("Maintenance", "Small repairs around the office"),
    ];

    for (name, description) in categories {
        create_category(
            NewCategory {
                name: CategoryName::new(name)?,
                description: description.to_owned(),
            },
            &conn,
        )?;
    }

    if let Some(staff) = staff {
        println!("Giving {} an opening float...", staff.email);
        record_top_up(
            NewTopUp {
                user_id: staff.id,
                amount: 200.0,
                source: "Petty cash tin".to_owned(),
                reference: "Opening float".to_owned(),
                remarks: String::new(),
                date: OffsetDateTime::now_utc().date(),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
