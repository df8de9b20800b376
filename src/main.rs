fn main() {
    if let Err(err) = order_analytics::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
