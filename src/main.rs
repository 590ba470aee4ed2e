use courtlight::{AppConfig, init_logging, run};

fn main() {
    let config = AppConfig::new().title("Courtlight");
    init_logging(config.logging.clone());

    if let Err(err) = run(config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
