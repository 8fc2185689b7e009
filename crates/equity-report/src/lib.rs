pub mod config;
pub mod narrative;
pub mod run;

pub use config::AppConfig;
pub use run::{generate_report, RunSummary};
