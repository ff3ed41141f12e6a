use congregation_calendar::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting congregation calendar dashboard");

    // Load configuration
    let config = startup::load_config()?;

    startup::run(config).await
}
