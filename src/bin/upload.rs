use s3_upload::cli::{self, Outcome};
use s3_upload::*;
use std::io::IsTerminal;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = S3Config::from_env();
    tracing::debug!(?config, "configuration loaded");

    match cli::run(&config, std::env::args_os(), s3_client).await {
        Ok(Outcome::Usage) => println!("{}", cli::usage(std::io::stdout().is_terminal())),
        Ok(Outcome::Uploaded(receipt)) => println!("{}", receipt),
        Err(Error::Cli { source }) => source.exit(),
        Err(e) => {
            eprintln!("{}", cli::red(&e.to_string(), std::io::stderr().is_terminal()));
            process::exit(e.exit_code());
        }
    }
}
