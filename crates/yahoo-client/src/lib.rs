use async_trait::async_trait;
use chrono::DateTime;
use report_core::{
    AnalystTargets, AnnualStatement, MarketDataSource, MarketSnapshot, PricePoint,
    ReportError, TickerBundle,
};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
/// Fixed lookback window for the price chart and performance figures.
const HISTORY_RANGE: &str = "2y";
const HISTORY_INTERVAL: &str = "1d";
const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryDetail,financialData,defaultKeyStatistics,incomeStatementHistory";

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Self {
        let timeout_secs: u64 = std::env::var("YAHOO_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Get the daily close-price history over the fixed lookback window.
    pub async fn get_history(&self, symbol: &str) -> Result<Vec<PricePoint>, ReportError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("range", HISTORY_RANGE), ("interval", HISTORY_INTERVAL)])
            .send()
            .await
            .map_err(|e| ReportError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReportError::Api(format!(
                "chart HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Api(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| ReportError::Api(format!("no chart data for {}", symbol)))?;

        Ok(history_from(&result))
    }

    /// Get the quote-summary modules the report needs in one call.
    async fn get_quote_summary(&self, symbol: &str) -> Result<QuoteSummaryResult, ReportError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_SUMMARY_MODULES)])
            .send()
            .await
            .map_err(|e| ReportError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReportError::Api(format!(
                "quoteSummary HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Api(e.to_string()))?;

        body.quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| ReportError::Api(format!("no quote summary for {}", symbol)))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn fetch(&self, symbol: &str) -> Result<TickerBundle, ReportError> {
        let history = self.get_history(symbol).await?;
        let summary = self.get_quote_summary(symbol).await?;

        tracing::debug!(
            symbol,
            points = history.len(),
            "fetched history and quote summary"
        );

        Ok(TickerBundle {
            symbol: symbol.to_string(),
            snapshot: snapshot_from(&summary),
            history,
            statements: statements_from(&summary),
            targets: targets_from(&summary),
        })
    }
}

fn history_from(result: &ChartResult) -> Vec<PricePoint> {
    let closes = result
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or(&[]);

    result
        .timestamp
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
            close.is_finite().then_some(PricePoint { date, close })
        })
        .collect()
}

fn snapshot_from(summary: &QuoteSummaryResult) -> MarketSnapshot {
    let price = &summary.price;
    let detail = &summary.summary_detail;
    let financial = &summary.financial_data;
    let stats = &summary.key_stats;
    let latest_statement = summary
        .income_statement_history
        .statements
        .first();

    MarketSnapshot {
        company_name: price
            .long_name
            .clone()
            .or_else(|| price.short_name.clone()),
        current_price: price.regular_market_price.value(),
        market_cap: price.market_cap.value(),
        beta: stats.beta.value().or_else(|| detail.beta.value()),
        total_debt: financial.total_debt.value(),
        total_cash: financial.total_cash.value(),
        total_revenue: financial.total_revenue.value(),
        trailing_eps: stats.trailing_eps.value(),
        forward_eps: stats.forward_eps.value(),
        trailing_pe: detail.trailing_pe.value(),
        revenue_growth: financial.revenue_growth.value(),
        earnings_growth: stats.earnings_quarterly_growth.value(),
        operating_margin: financial.operating_margins.value(),
        profit_margin: financial.profit_margins.value(),
        return_on_equity: financial.return_on_equity.value(),
        interest_expense: latest_statement.and_then(|s| s.interest_expense.value()),
        number_of_analysts: financial
            .number_of_analyst_opinions
            .value()
            .map(|v| v as i32),
    }
}

fn statements_from(summary: &QuoteSummaryResult) -> Option<Vec<AnnualStatement>> {
    let statements = &summary.income_statement_history.statements;
    if statements.is_empty() {
        return None;
    }
    Some(
        statements
            .iter()
            .map(|s| AnnualStatement {
                end_date: s
                    .end_date
                    .value()
                    .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
                    .map(|dt| dt.date_naive()),
                total_revenue: s.total_revenue.value(),
                interest_expense: s.interest_expense.value(),
            })
            .collect(),
    )
}

fn targets_from(summary: &QuoteSummaryResult) -> Option<AnalystTargets> {
    let financial = &summary.financial_data;
    let mean = financial.target_mean_price.value()?;
    Some(AnalystTargets {
        mean: Some(mean),
        low: financial.target_low_price.value(),
        high: financial.target_high_price.value(),
    })
}

// Response structures.
//
// Yahoo wraps most numbers as `{"raw": 1.23, "fmt": "1.23"}` and omits or
// nulls anything it does not have; `Num` accepts the wrapper, a plain
// number, or anything else (treated as absent).

#[derive(Debug, Default, Clone, Copy)]
struct Num(Option<f64>);

impl Num {
    fn value(self) -> Option<f64> {
        self.0.filter(|v| v.is_finite())
    }
}

impl<'de> Deserialize<'de> for Num {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Plain(f64),
            Wrapped { raw: Option<f64> },
            Other(serde_json::Value),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Plain(v) => Num(Some(v)),
            Wire::Wrapped { raw } => Num(raw),
            Wire::Other(_) => Num(None),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryNode,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryNode {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: PriceModule,
    #[serde(default, rename = "summaryDetail")]
    summary_detail: SummaryDetailModule,
    #[serde(default, rename = "financialData")]
    financial_data: FinancialDataModule,
    #[serde(default, rename = "defaultKeyStatistics")]
    key_stats: KeyStatisticsModule,
    #[serde(default, rename = "incomeStatementHistory")]
    income_statement_history: IncomeStatementHistoryModule,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(default, rename = "longName")]
    long_name: Option<String>,
    #[serde(default, rename = "shortName")]
    short_name: Option<String>,
    #[serde(default, rename = "regularMarketPrice")]
    regular_market_price: Num,
    #[serde(default, rename = "marketCap")]
    market_cap: Num,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    #[serde(default)]
    beta: Num,
    #[serde(default, rename = "trailingPE")]
    trailing_pe: Num,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(default, rename = "totalDebt")]
    total_debt: Num,
    #[serde(default, rename = "totalCash")]
    total_cash: Num,
    #[serde(default, rename = "totalRevenue")]
    total_revenue: Num,
    #[serde(default, rename = "revenueGrowth")]
    revenue_growth: Num,
    #[serde(default, rename = "operatingMargins")]
    operating_margins: Num,
    #[serde(default, rename = "profitMargins")]
    profit_margins: Num,
    #[serde(default, rename = "returnOnEquity")]
    return_on_equity: Num,
    #[serde(default, rename = "targetMeanPrice")]
    target_mean_price: Num,
    #[serde(default, rename = "targetLowPrice")]
    target_low_price: Num,
    #[serde(default, rename = "targetHighPrice")]
    target_high_price: Num,
    #[serde(default, rename = "numberOfAnalystOpinions")]
    number_of_analyst_opinions: Num,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatisticsModule {
    #[serde(default)]
    beta: Num,
    #[serde(default, rename = "trailingEps")]
    trailing_eps: Num,
    #[serde(default, rename = "forwardEps")]
    forward_eps: Num,
    #[serde(default, rename = "earningsQuarterlyGrowth")]
    earnings_quarterly_growth: Num,
}

#[derive(Debug, Default, Deserialize)]
struct IncomeStatementHistoryModule {
    #[serde(default, rename = "incomeStatementHistory")]
    statements: Vec<IncomeStatementEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct IncomeStatementEntry {
    #[serde(default, rename = "endDate")]
    end_date: Num,
    #[serde(default, rename = "totalRevenue")]
    total_revenue: Num,
    #[serde(default, rename = "interestExpense")]
    interest_expense: Num,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_accepts_wrapper_plain_and_garbage() {
        let wrapped: Num = serde_json::from_str(r#"{"raw": 1030.05, "fmt": "1,030.05"}"#).unwrap();
        assert_eq!(wrapped.value(), Some(1030.05));

        let plain: Num = serde_json::from_str("42.5").unwrap();
        assert_eq!(plain.value(), Some(42.5));

        let empty: Num = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.value(), None);

        let garbage: Num = serde_json::from_str(r#""n/a""#).unwrap();
        assert_eq!(garbage.value(), None);
    }

    #[test]
    fn chart_history_skips_null_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1717977600, 1718064000, 1718150400],
                    "indicators": {"quote": [{"close": [870.5, null, 882.1]}]}
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let result = parsed.chart.result.unwrap().remove(0);
        let history = history_from(&result);

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].close, 870.5);
        assert_eq!(history[1].close, 882.1);
        assert!(history[1].date > history[0].date);
    }

    fn sample_summary() -> QuoteSummaryResult {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {
                        "longName": "Eli Lilly and Company",
                        "regularMarketPrice": {"raw": 1030.05},
                        "marketCap": {"raw": 980000000000}
                    },
                    "summaryDetail": {
                        "beta": {"raw": 0.41},
                        "trailingPE": {"raw": 52.3}
                    },
                    "financialData": {
                        "totalDebt": {"raw": 25000000000},
                        "totalCash": {"raw": 3000000000},
                        "totalRevenue": {"raw": 45000000000},
                        "revenueGrowth": {"raw": 0.32},
                        "operatingMargins": {"raw": 0.483},
                        "profitMargins": {"raw": 0.22},
                        "returnOnEquity": {"raw": 0.85},
                        "targetMeanPrice": {"raw": 1015.0},
                        "targetLowPrice": {"raw": 850.0},
                        "targetHighPrice": {"raw": 1250.0},
                        "numberOfAnalystOpinions": {"raw": 28}
                    },
                    "defaultKeyStatistics": {
                        "trailingEps": {"raw": 20.45},
                        "forwardEps": {"raw": 22.66}
                    },
                    "incomeStatementHistory": {
                        "incomeStatementHistory": [
                            {
                                "endDate": {"raw": 1735603200},
                                "totalRevenue": {"raw": 45000000000},
                                "interestExpense": {"raw": -800000000}
                            },
                            {
                                "endDate": {"raw": 1703980800},
                                "totalRevenue": {"raw": 34100000000}
                            }
                        ]
                    }
                }],
                "error": null
            }
        }"#;
        let parsed: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        parsed.quote_summary.result.unwrap().remove(0)
    }

    #[test]
    fn snapshot_maps_all_modules() {
        let snapshot = snapshot_from(&sample_summary());
        assert_eq!(
            snapshot.company_name.as_deref(),
            Some("Eli Lilly and Company")
        );
        assert_eq!(snapshot.current_price, Some(1030.05));
        assert_eq!(snapshot.market_cap, Some(980e9));
        assert_eq!(snapshot.beta, Some(0.41));
        assert_eq!(snapshot.operating_margin, Some(0.483));
        assert_eq!(snapshot.forward_eps, Some(22.66));
        assert_eq!(snapshot.interest_expense, Some(-800000000.0));
        assert_eq!(snapshot.number_of_analysts, Some(28));
    }

    #[test]
    fn statements_arrive_most_recent_first() {
        let statements = statements_from(&sample_summary()).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].total_revenue, Some(45e9));
        assert_eq!(statements[1].total_revenue, Some(34.1e9));
        assert!(statements[0].end_date.unwrap() > statements[1].end_date.unwrap());
        assert!(statements[1].interest_expense.is_none());
    }

    #[test]
    fn targets_require_a_mean() {
        let targets = targets_from(&sample_summary()).unwrap();
        assert_eq!(targets.mean, Some(1015.0));
        assert_eq!(targets.low, Some(850.0));
        assert_eq!(targets.high, Some(1250.0));

        let empty = QuoteSummaryResult::default();
        assert!(targets_from(&empty).is_none());
    }

    #[test]
    fn missing_modules_degrade_to_none() {
        let body = r#"{"quoteSummary": {"result": [{"price": {"regularMarketPrice": {"raw": 10.0}}}], "error": null}}"#;
        let parsed: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        let summary = parsed.quote_summary.result.unwrap().remove(0);
        let snapshot = snapshot_from(&summary);

        assert_eq!(snapshot.current_price, Some(10.0));
        assert!(snapshot.beta.is_none());
        assert!(snapshot.operating_margin.is_none());
        assert!(statements_from(&summary).is_none());
        assert!(targets_from(&summary).is_none());
    }
}
