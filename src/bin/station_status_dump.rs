use std::sync::{Arc, Mutex};

use station_monitor::adapters::db::open_connection;
use station_monitor::app::services::{SqliteStationStore, StationStatusQuery};

fn main() {
    if let Err(error) = run() {
        eprintln!("failed to dump station status: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut path = "data.SQLite".to_string();
    let mut station_id: Option<i64> = None;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--path" => {
                let Some(value) = args.get(index + 1) else {
                    return Err("--path requires a value".to_string());
                };
                path = value.clone();
                index += 2;
            }
            "--station" => {
                let Some(value) = args.get(index + 1) else {
                    return Err("--station requires a value".to_string());
                };
                let parsed = value
                    .parse::<i64>()
                    .map_err(|_| format!("--station must be an integer, got {value}"))?;
                station_id = Some(parsed);
                index += 2;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other}"));
            }
        }
    }

    let connection = open_connection(&path).map_err(|error| error.to_string())?;
    let store = SqliteStationStore::new(Arc::new(Mutex::new(connection)), 3);

    let output = match station_id {
        Some(station_id) => {
            let report = store.get(station_id).map_err(|error| error.to_string())?;
            serde_json::to_string_pretty(&report)
        }
        None => {
            let reports = store.list().map_err(|error| error.to_string())?;
            serde_json::to_string_pretty(&reports)
        }
    }
    .map_err(|error| error.to_string())?;

    println!("{output}");
    Ok(())
}

fn print_help() {
    println!("station_status_dump");
    println!();
    println!("Usage:");
    println!("  cargo run --bin station_status_dump -- [--path <file>] [--station <id>]");
    println!();
    println!("Options:");
    println!("  --path <file>     sqlite file to read (default: data.SQLite)");
    println!("  --station <id>    print a single station instead of all rows");
}
