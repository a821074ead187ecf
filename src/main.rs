use std::error::Error as _;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cloudcmd::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli).await {
        // Null output (void responses) prints nothing, like a shell no-op.
        Ok(Some(value)) if !value.is_null() => match serde_json::to_string_pretty(&value) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("cloudcmd: failed to render output: {err}");
                std::process::exit(1);
            }
        },
        Ok(_) => {}
        Err(err) => {
            eprintln!("cloudcmd: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            let code = if err.is_configuration() { 2 } else { 1 };
            std::process::exit(code);
        }
    }
}
