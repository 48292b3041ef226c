use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    resource_monitor::example_apps::run_scan_demo(std::env::args().skip(1))
}
