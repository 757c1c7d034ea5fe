fn main() {
    if let Err(err) = promo_dataset::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
