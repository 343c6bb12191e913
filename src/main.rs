// src/main.rs

use taskdag::{cli, logging, run};

// No #[tokio::main]: the runtime flavour depends on the selected execution
// mode, so `Orchestrator::run_blocking` builds it internally.
fn main() {
    if let Err(err) = run_main() {
        eprintln!("taskdag error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    if !args.worker {
        logging::init_logging(args.log_level)?;
    }
    run(args)?;
    Ok(())
}
