//! Chart rendering.
//!
//! Every chart is drawn into an in-memory RGB bitmap and returned as a
//! [`ChartImage`]; the PDF and workbook writers embed those directly, so no
//! image files are left on disk.

use crate::error::ReportError;
use analytics::{AnalysisColumn, StockAnalysis, histogram};
use chrono::NaiveDate;
use core_types::DcfAnalysis;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io::Cursor;
use std::ops::Range;

/// 10 x 6 inches at 100 dpi.
pub const DCF_CHART_SIZE: (u32, u32) = (1000, 600);
/// 12 x 6 inches at 100 dpi.
pub const STOCK_CHART_SIZE: (u32, u32) = (1200, 600);

/// Palette for multi-series charts, cycled in order.
const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// A rendered chart: tightly packed 8-bit RGB pixels, row-major.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl ChartImage {
    pub fn from_rgb(
        title: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, ReportError> {
        let title = title.into();
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(ReportError::Chart {
                title,
                reason: format!("expected {expected} bytes of RGB data, got {}", pixels.len()),
            });
        }
        Ok(Self {
            title,
            width,
            height,
            pixels,
        })
    }

    pub fn to_dynamic_image(&self) -> Result<DynamicImage, ReportError> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| ReportError::Chart {
                title: self.title.clone(),
                reason: "pixel buffer does not match dimensions".to_string(),
            })
    }

    pub fn to_png(&self) -> Result<Vec<u8>, ReportError> {
        let mut bytes = Vec::new();
        self.to_dynamic_image()?
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

/// "Free Cash Flow - Historical vs Projected": history at negative years,
/// projection at positive ones.
pub fn fcf_chart(analysis: &DcfAnalysis) -> Result<ChartImage, ReportError> {
    let title = "Free Cash Flow - Historical vs Projected";
    let historical = historical_points(&analysis.historical_fcf());
    let projected: Vec<(i32, f64)> = analysis
        .projection
        .records
        .iter()
        .map(|r| (r.year as i32, to_f64(r.fcf)))
        .collect();

    let x_range = year_range(historical.iter().chain(&projected).map(|p| p.0));
    let y_range = padded_range(historical.iter().chain(&projected).map(|p| p.1));

    render(title, DCF_CHART_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("FCF ($)")
            .draw()?;

        chart
            .draw_series(LineSeries::new(historical, BLUE.stroke_width(2)))?
            .label("Historical FCF")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
        chart
            .draw_series(DashedLineSeries::new(projected, 10, 6, RED.stroke_width(2)))?
            .label("Projected FCF")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })
}

/// "Projected Revenue Growth Rates", in percent.
pub fn growth_chart(analysis: &DcfAnalysis) -> Result<ChartImage, ReportError> {
    let title = "Projected Revenue Growth Rates";
    let points: Vec<(i32, f64)> = analysis
        .projection
        .growth_rates
        .iter()
        .zip(1..)
        .map(|(&rate, year)| (year, to_f64(rate) * 100.0))
        .collect();

    let x_range = year_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));

    render(title, DCF_CHART_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Growth Rate (%)")
            .draw()?;

        // Markers keep a one-year horizon visible.
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, GREEN.filled())))?;
        chart.draw_series(LineSeries::new(points, GREEN.stroke_width(2)))?;
        Ok(())
    })
}

/// Price with the short and long moving averages.
pub fn price_chart(analysis: &StockAnalysis) -> Result<ChartImage, ReportError> {
    let price: Vec<(NaiveDate, Option<f64>)> = analysis
        .prices()
        .into_iter()
        .map(|(d, p)| (d, Some(p)))
        .collect();
    let lines = vec![
        (analysis.price_field.label().to_string(), price),
        (
            analysis.label(AnalysisColumn::MaShort),
            analysis.column(AnalysisColumn::MaShort),
        ),
        (
            analysis.label(AnalysisColumn::MaLong),
            analysis.column(AnalysisColumn::MaLong),
        ),
    ];
    dated_line_chart("Stock Price Moving Avg", "Date", "Price", &lines)
}

/// Distribution of daily returns.
pub fn returns_histogram(analysis: &StockAnalysis) -> Result<ChartImage, ReportError> {
    let title = "Daily Returns Histogram";
    let returns = analysis.column(AnalysisColumn::DailyReturn);
    let values: Vec<Option<f64>> = returns.into_iter().map(|(_, r)| r).collect();
    let bins = histogram(&values, analysis.windows.histogram_bins);
    if bins.is_empty() {
        return Err(ReportError::Empty(format!(
            "{} has no daily returns to plot",
            analysis.symbol
        )));
    }

    let x_range = bins[0].lower..bins[bins.len() - 1].upper;
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let y_range = 0.0..(max_count.max(1) as f64 * 1.05);

    render(title, STOCK_CHART_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc("Daily Return")
            .y_desc("Frequency")
            .draw()?;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                BLUE.mix(0.75).filled(),
            )
        }))?;
        Ok(())
    })
}

pub fn volatility_chart(analysis: &StockAnalysis) -> Result<ChartImage, ReportError> {
    let lines = vec![(
        analysis.label(AnalysisColumn::Volatility),
        analysis.column(AnalysisColumn::Volatility),
    )];
    dated_line_chart("Rolling Volatility", "Date", "Volatility", &lines)
}

/// The three charts of the single-stock workbook, in sheet order.
pub fn stock_charts(analysis: &StockAnalysis) -> Result<Vec<ChartImage>, ReportError> {
    Ok(vec![
        price_chart(analysis)?,
        returns_histogram(analysis)?,
        volatility_chart(analysis)?,
    ])
}

/// "Stock Price Comparison" and "Stock Volatility Comparison", one line per ticker.
pub fn comparison_charts(analyses: &[StockAnalysis]) -> Result<Vec<ChartImage>, ReportError> {
    let prices: Vec<(String, Vec<(NaiveDate, Option<f64>)>)> = analyses
        .iter()
        .map(|a| {
            let points = a.prices().into_iter().map(|(d, p)| (d, Some(p))).collect();
            (a.symbol.clone(), points)
        })
        .collect();
    let volatility: Vec<(String, Vec<(NaiveDate, Option<f64>)>)> = analyses
        .iter()
        .map(|a| (a.symbol.clone(), a.column(AnalysisColumn::Volatility)))
        .collect();

    Ok(vec![
        dated_line_chart("Stock Price Comparison", "Date", "Stock Price", &prices)?,
        dated_line_chart("Stock Volatility Comparison", "Date", "Volatility", &volatility)?,
    ])
}

fn dated_line_chart(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    lines: &[(String, Vec<(NaiveDate, Option<f64>)>)],
) -> Result<ChartImage, ReportError> {
    let dates = lines.iter().flat_map(|(_, points)| points.iter().map(|p| p.0));
    let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
        return Err(ReportError::Empty(format!("{title} has no data")));
    };
    let x_range = first..last.max(first.succ_opt().unwrap_or(first));
    let y_range = padded_range(
        lines
            .iter()
            .flat_map(|(_, points)| points.iter().filter_map(|p| p.1)),
    );

    render(title, STOCK_CHART_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        for (i, (label, points)) in lines.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            for (n, segment) in segments(points).into_iter().enumerate() {
                let series = chart.draw_series(LineSeries::new(segment, color.stroke_width(2)))?;
                if n == 0 {
                    series.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })
}

fn render<F>(title: &str, (width, height): (u32, u32), draw: F) -> Result<ChartImage, ReportError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult,
{
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        let drawn: DrawResult = (|| {
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
            Ok(())
        })();
        drawn.map_err(|e| ReportError::Chart {
            title: title.to_string(),
            reason: e.to_string(),
        })?;
    }
    tracing::debug!(title, width, height, "Rendered chart.");
    ChartImage::from_rgb(title, width, height, pixels)
}

/// Historical values placed at x = -len .. -1.
fn historical_points(values: &[Decimal]) -> Vec<(i32, f64)> {
    let len = values.len() as i32;
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as i32 - len, to_f64(v)))
        .collect()
}

/// Runs of consecutive defined values; undefined values break the line.
fn segments<X: Copy>(points: &[(X, Option<f64>)]) -> Vec<Vec<(X, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        match y {
            Some(y) if y.is_finite() => current.push((x, y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Integer year axis with half a year of room either side.
fn year_range(years: impl Iterator<Item = i32>) -> Range<i32> {
    let (lo, hi) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if lo > hi { 0..1 } else { (lo - 1)..(hi + 1) }
}

/// Value axis spanning the data with 5% headroom; a flat or empty series gets
/// a unit-wide band so the axis is never degenerate.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 0.5)..(hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn history_sits_left_of_zero() {
        let points = historical_points(&[dec!(1), dec!(2), dec!(3)]);
        assert_eq!(points, vec![(-3, 1.0), (-2, 2.0), (-1, 3.0)]);
    }

    #[test]
    fn gaps_split_lines_into_segments() {
        let points = [(0, None), (1, Some(1.0)), (2, Some(2.0)), (3, None), (4, Some(4.0))];
        let segs = segments(&points);
        assert_eq!(segs, vec![vec![(1, 1.0), (2, 2.0)], vec![(4, 4.0)]]);
        assert!(segments::<i32>(&[(0, None)]).is_empty());
    }

    #[test]
    fn padded_range_never_collapses() {
        assert_eq!(padded_range([2.0, 2.0].into_iter()), 1.5..2.5);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        let r = padded_range([0.0, 100.0, f64::NAN].into_iter());
        assert_eq!(r, -5.0..105.0);
    }

    #[test]
    fn year_range_pads_both_ends() {
        assert_eq!(year_range([-5, -1, 1, 5].into_iter()), -6..6);
        assert_eq!(year_range(std::iter::empty()), 0..1);
    }

    #[test]
    fn chart_image_encodes_png() {
        let image = ChartImage::from_rgb("test", 2, 2, vec![255; 12]).unwrap();
        let png = image.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn chart_image_rejects_short_buffer() {
        assert!(ChartImage::from_rgb("bad", 2, 2, vec![0; 5]).is_err());
    }

    mod rendering {
        use super::super::*;
        use analytics::AnalyticsEngine;
        use chrono::Days;
        use core_types::{
            CashFlowRecord, HistoricalRecord, PriceBar, PriceSeries, ProjectedRecord, Projection,
            ProjectionAssumptions, ValuationResult,
        };
        use rust_decimal_macros::dec;

        /// Text needs a system font. Hosts without one report a font error;
        /// any other failure is a real defect.
        fn rendered(result: Result<ChartImage, ReportError>) -> Option<ChartImage> {
            match result {
                Ok(chart) => Some(chart),
                Err(ReportError::Chart { reason, .. }) if reason.to_lowercase().contains("font") => {
                    eprintln!("skipping chart render check: {reason}");
                    None
                }
                Err(e) => panic!("chart rendering failed: {e}"),
            }
        }

        fn assert_drawn(chart: &ChartImage, (width, height): (u32, u32)) {
            assert_eq!((chart.width, chart.height), (width, height));
            assert_eq!(chart.pixels.len(), (width * height * 3) as usize);
            assert!(chart.pixels.iter().any(|&b| b != 255), "{} is blank", chart.title);
        }

        fn dcf_analysis() -> DcfAnalysis {
            let history = [dec!(100), dec!(110)]
                .iter()
                .map(|&revenue| CashFlowRecord {
                    record: HistoricalRecord {
                        period: None,
                        revenue,
                        operating_expenses: revenue * dec!(0.8),
                        depreciation: dec!(5),
                        capex: dec!(7),
                        change_in_working_capital: dec!(2),
                    },
                    ebit: revenue * dec!(0.2),
                    nopat: revenue * dec!(0.158),
                    fcf: revenue * dec!(0.158) - dec!(4),
                })
                .collect();
            let growth_rates = vec![dec!(0.1), dec!(0.06), dec!(0.02)];
            let records = growth_rates
                .iter()
                .zip(1u32..)
                .map(|(&growth_rate, year)| ProjectedRecord {
                    year,
                    growth_rate,
                    revenue: dec!(120) + Decimal::from(year),
                    ebit: dec!(24),
                    fcf: dec!(18.96),
                })
                .collect();
            DcfAnalysis {
                assumptions: ProjectionAssumptions::new(dec!(0.10), dec!(0.02), 3).unwrap(),
                history,
                projection: Projection {
                    historical_growth: dec!(0.1),
                    average_margin: dec!(0.2),
                    growth_rates,
                    records,
                },
                valuation: ValuationResult {
                    pv_fcf: dec!(47.15),
                    terminal_value: dec!(241.74),
                    pv_terminal_value: dec!(181.62),
                    total_value: dec!(228.77),
                },
            }
        }

        fn series(symbol: &str, n: u64) -> PriceSeries {
            let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
            let bars = (0..n)
                .map(|i| {
                    let p = 100.0 + (i as f64 * 0.4).sin() * 6.0 + i as f64 * 0.1;
                    PriceBar {
                        date: start + Days::new(i),
                        open: p,
                        high: p + 1.0,
                        low: p - 1.0,
                        close: p,
                        adj_close: p,
                        volume: 1_000,
                    }
                })
                .collect();
            PriceSeries::new(symbol, bars)
        }

        #[test]
        fn dcf_charts_render_at_report_size() {
            let analysis = dcf_analysis();
            if let Some(chart) = rendered(fcf_chart(&analysis)) {
                assert_eq!(chart.title, "Free Cash Flow - Historical vs Projected");
                assert_drawn(&chart, DCF_CHART_SIZE);
            }
            if let Some(chart) = rendered(growth_chart(&analysis)) {
                assert_drawn(&chart, DCF_CHART_SIZE);
            }
        }

        #[test]
        fn stock_and_comparison_charts_render() {
            let engine = AnalyticsEngine::default();
            let aapl = engine.analyze(&series("AAPL", 120), &series("^GSPC", 120)).unwrap();
            let msft = engine.analyze_basic(&series("MSFT", 120)).unwrap();

            if let Some(chart) = rendered(price_chart(&aapl)) {
                assert_drawn(&chart, STOCK_CHART_SIZE);
                let charts = stock_charts(&aapl).unwrap();
                assert_eq!(charts.len(), 3);
                charts.iter().for_each(|c| assert_drawn(c, STOCK_CHART_SIZE));

                let comparison = comparison_charts(&[aapl, msft]).unwrap();
                assert_eq!(comparison.len(), 2);
                assert_eq!(comparison[0].title, "Stock Price Comparison");
                comparison.iter().for_each(|c| assert_drawn(c, STOCK_CHART_SIZE));
            }
        }
    }
}
