fn main() {
    if let Err(err) = station_monitor::app::run_reporter() {
        eprintln!("reporter startup failed: {err}");
        std::process::exit(1);
    }
}
