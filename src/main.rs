use std::process::ExitCode;

use clap::Parser;
use resto_admin_lib::cli::Cli;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    resto_admin_lib::init_logging();

    let cli = Cli::parse();
    match resto_admin_lib::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Erreur : {}", err);
            ExitCode::FAILURE
        }
    }
}
