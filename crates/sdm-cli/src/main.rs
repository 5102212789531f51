use sdm_core::logging;

mod cli;

fn main() {
    // Initialize diagnostics as early as possible; the report stream owns stdout.
    logging::init();

    if let Err(err) = cli::run_from_args() {
        eprintln!("sdm error: {:#}", err);
        std::process::exit(1);
    }
}
