fn main() {
    if let Err(err) = station_monitor::app::run_collector() {
        eprintln!("collector startup failed: {err}");
        std::process::exit(1);
    }
}
