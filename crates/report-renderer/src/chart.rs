//! Price chart rendering.

use plotters::prelude::*;
use report_core::{PricePoint, ReportError};
use std::path::Path;

/// Chart geometry: 8.5 x 4.5 inches at 150 dpi, matching the slot the PDF
/// reserves for it.
pub const CHART_WIDTH_PX: u32 = 1275;
pub const CHART_HEIGHT_PX: u32 = 675;

const CLOSE_COLOR: RGBColor = RGBColor(41, 128, 185);
const FILL_COLOR: RGBColor = RGBColor(52, 152, 219);
const MA20_COLOR: RGBColor = RGBColor(255, 165, 0);
const MA50_COLOR: RGBColor = RGBColor(220, 20, 60);
const MA200_COLOR: RGBColor = RGBColor(128, 0, 128);

/// Simple moving average; `None` until the window is full.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, v) in values.iter().enumerate() {
        running += v;
        if i >= window {
            running -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(running / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Render the close-price series with 20/50/200-day moving averages to a
/// PNG. The 200-day average is drawn only when the series is long enough.
pub fn render_price_chart(history: &[PricePoint], out_path: &Path) -> Result<(), ReportError> {
    if history.is_empty() {
        return Err(ReportError::Render("no price data to chart".to_string()));
    }

    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    let ma20 = moving_average(&closes, 20);
    let ma50 = moving_average(&closes, 50);
    let ma200 = moving_average(&closes, 200);

    let min = closes.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.05).max(max * 0.01);
    let y_range = (min - pad)..(max + pad);

    let root = BitMapBackend::new(out_path, (CHART_WIDTH_PX, CHART_HEIGHT_PX))
        .into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ReportError::Render(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .build_cartesian_2d(0..closes.len(), y_range.clone())
        .map_err(|e| ReportError::Render(e.to_string()))?;

    chart
        .draw_series(AreaSeries::new(
            closes.iter().enumerate().map(|(i, c)| (i, *c)),
            y_range.start,
            FILL_COLOR.mix(0.3),
        ))
        .map_err(|e| ReportError::Render(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(
            closes.iter().enumerate().map(|(i, c)| (i, *c)),
            CLOSE_COLOR.stroke_width(2),
        ))
        .map_err(|e| ReportError::Render(e.to_string()))?;

    let averages: [(&[Option<f64>], RGBColor, bool); 3] = [
        (&ma20, MA20_COLOR, true),
        (&ma50, MA50_COLOR, true),
        (&ma200, MA200_COLOR, closes.len() >= 200),
    ];
    for (series, color, enabled) in averages {
        if !enabled {
            continue;
        }
        chart
            .draw_series(LineSeries::new(
                series
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| (i, v))),
                color.mix(0.7).stroke_width(1),
            ))
            .map_err(|e| ReportError::Render(e.to_string()))?;
    }

    root.present()
        .map_err(|e| ReportError::Render(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history(n: usize) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..n)
            .map(|i| PricePoint {
                date: start + chrono::Days::new(i as u64),
                close: 800.0 + (i as f64) * 0.5,
            })
            .collect()
    }

    #[test]
    fn moving_average_fills_after_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ma = moving_average(&values, 3);
        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert!((ma[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((ma[3].unwrap() - 3.0).abs() < 1e-12);
        assert!((ma[4].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn moving_average_of_oversized_window_is_all_none() {
        let values = [1.0, 2.0];
        assert!(moving_average(&values, 5).iter().all(|v| v.is_none()));
    }

    #[test]
    fn empty_history_is_a_render_failure() {
        let path = std::env::temp_dir().join("equity_report_empty_chart.png");
        let err = render_price_chart(&[], &path).unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
    }

    #[test]
    fn renders_png_artifact() {
        let path = std::env::temp_dir().join(format!(
            "equity_report_chart_{}.png",
            std::process::id()
        ));
        render_price_chart(&history(260), &path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
        let _ = std::fs::remove_file(&path);
    }
}
