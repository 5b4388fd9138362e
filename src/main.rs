/// The entry point of the relay.
/// Runs the server and reports startup or runtime errors on stderr.
#[tokio::main]
async fn main() -> std::process::ExitCode {
    match ccrelay_lib::run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            // The logger may not be installed yet when configuration fails.
            log::error!("ccrelay stopped: {}", e);
            eprintln!("ccrelay stopped: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
