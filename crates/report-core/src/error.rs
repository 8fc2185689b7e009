use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate valuation: {0}")]
    DegenerateValuation(String),

    #[error("Render failure: {0}")]
    Render(String),
}

impl ReportError {
    /// True for conditions that invalidate a valuation leg (the DCF) without
    /// invalidating the rest of the report.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, ReportError::DegenerateValuation(_))
    }
}
