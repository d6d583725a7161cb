use snap_convert::cmd;
use tracing::{error, info};

fn main() {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    match cmd::Cli::run() {
        Ok(()) => info!("done"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
