use std::time::Duration;

use station_monitor::app::services::{SqliteStationStore, StationStatusQuery, StationStatusStore};
use station_monitor::domain::clock::{Clock, SystemClock, format_last_seen};
use station_monitor::domain::message::WireMessage;
use station_monitor::domain::models::StationReport;
use station_monitor::domain::validation::{ParsedReport, validate};

#[derive(Debug, PartialEq)]
struct SeedArgs {
    path: String,
    last_seen: Option<String>,
    stations: Vec<ParsedReport>,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return;
    }

    if let Err(error) = parse_args(&args).and_then(|seed| run(&seed)) {
        eprintln!("failed to seed stations: {error}");
        std::process::exit(1);
    }
}

fn run(seed: &SeedArgs) -> Result<(), String> {
    let store = SqliteStationStore::open(&seed.path, Duration::from_secs(1), 3)
        .map_err(|error| error.to_string())?;
    let last_seen = seed
        .last_seen
        .clone()
        .unwrap_or_else(|| format_last_seen(SystemClock.now()));

    for parsed in &seed.stations {
        let report = StationReport::from_parsed(*parsed, last_seen.clone());
        store.upsert(&report).map_err(|error| error.to_string())?;
        println!(
            "station {} -> alarm1={} alarm2={} at {}",
            report.station_id, report.alarm1 as u8, report.alarm2 as u8, report.last_seen
        );
    }

    let count = store.count().map_err(|error| error.to_string())?;
    println!("{} now holds {count} station(s)", seed.path);
    Ok(())
}

fn parse_args(args: &[String]) -> Result<SeedArgs, String> {
    let mut seed = SeedArgs {
        path: "data.SQLite".to_string(),
        last_seen: None,
        stations: Vec::new(),
    };

    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        let Some(value) = args.get(index + 1) else {
            return Err(format!("{flag} requires a value"));
        };
        match flag {
            "--path" => seed.path = value.clone(),
            "--at" => seed.last_seen = Some(parse_last_seen(value)?),
            "--station" => seed.stations.push(parse_station(value)?),
            other => return Err(format!("unknown argument: {other}")),
        }
        index += 2;
    }

    if seed.stations.is_empty() {
        return Err("at least one --station id:alarm1:alarm2 is required".to_string());
    }

    Ok(seed)
}

fn parse_station(raw: &str) -> Result<ParsedReport, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [station_id, alarm1, alarm2] = parts.as_slice() else {
        return Err(format!("--station expects id:alarm1:alarm2, got {raw:?}"));
    };

    validate(&WireMessage {
        station_id: station_id.to_string(),
        alarm1: alarm1.to_string(),
        alarm2: alarm2.to_string(),
    })
    .map_err(|error| format!("--station {raw}: {error}"))
}

fn parse_last_seen(raw: &str) -> Result<String, String> {
    chrono::NaiveDateTime::parse_from_str(raw, station_monitor::domain::clock::LAST_SEEN_FORMAT)
        .map(format_last_seen)
        .map_err(|_| format!("--at expects YYYY-MM-DD HH:MM, got {raw:?}"))
}

fn print_help() {
    println!("seed_stations");
    println!();
    println!("Usage:");
    println!(
        "  cargo run --bin seed_stations -- --station <id:a1:a2> [--station ...] [--path <file>] [--at <YYYY-MM-DD HH:MM>]"
    );
    println!();
    println!("Options:");
    println!("  --station <id:a1:a2>   station row to upsert; repeatable");
    println!("  --path <file>          sqlite file (default: data.SQLite)");
    println!("  --at <timestamp>       last_date to store (default: now)");
}
