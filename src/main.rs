// src/main.rs

use cmdpipe::{PipeError, cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("cmdpipe error: {err:?}");
        let code = err
            .downcast_ref::<PipeError>()
            .and_then(PipeError::code)
            .filter(|code| *code > 0)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
