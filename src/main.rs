use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tagsel::cli;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args = cli::Args::parse();

    match cli::run(&args, &mut std::io::stdout().lock()) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let code = cli::exit_code(&err);
            if code == cli::EXIT_SYNTAX {
                eprintln!("syntax error: {err:#}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::from(code)
        }
    }
}
