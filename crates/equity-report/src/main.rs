use equity_report::{generate_report, AppConfig};
use tracing_subscriber::EnvFilter;
use yahoo_client::YahooClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let source = YahooClient::new();

    match generate_report(&source, &config).await {
        Ok(summary) => {
            println!(
                "Report generated successfully: {} ({} pages)",
                summary.document.path.display(),
                summary.document.pages
            );
        }
        Err(e) => {
            tracing::error!("report generation failed: {e:#}");
            std::process::exit(1);
        }
    }
}
