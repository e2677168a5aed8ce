fn main() {
    if let Err(err) = station_monitor::app::run_collector() {
        eprintln!("application startup failed: {err}");
        std::process::exit(1);
    }
}
