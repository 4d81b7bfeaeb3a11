use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    courier_cli::run().await
}
