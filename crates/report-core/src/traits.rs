use crate::{ReportError, TickerBundle};
use async_trait::async_trait;

/// Trait for market-data providers. Implementations must tolerate partially
/// missing data (absent fields map to `None`) and only error when the symbol
/// cannot be fetched at all.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<TickerBundle, ReportError>;
}
