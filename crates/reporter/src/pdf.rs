use crate::charts::ChartImage;
use crate::error::ReportError;
use crate::format::{format_currency, format_percent};
use core_types::DcfAnalysis;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;
const CONTENT_TOP: f32 = PAGE_HEIGHT - MARGIN;

const TABLE_LABEL_WIDTH: f32 = 70.0;
const TABLE_VALUE_WIDTH: f32 = 60.0;
const TABLE_ROW_HEIGHT: f32 = 11.0;

/// Charts are placed 500 x 300 points wide, the size of a 10 x 6 inch figure
/// scaled onto the page.
const CHART_WIDTH: f32 = 176.4;
const CHART_GAP: f32 = 7.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Writes the US-letter DCF report: title, key assumptions, a gridded table of
/// valuation results, then each chart in order, flowing onto new pages as
/// needed.
pub fn write_dcf_report(
    analysis: &DcfAnalysis,
    charts: &[ChartImage],
    path: impl AsRef<Path>,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let (doc, page, layer) = PdfDocument::new(
        "DCF Analysis Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?,
    };
    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = CONTENT_TOP;

    y -= 9.0;
    layer.use_text("DCF Analysis Report", 24.0, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= 16.0;

    layer.use_text("Key Assumptions:", 16.0, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= 8.0;
    let assumptions = &analysis.assumptions;
    for line in [
        format!("WACC: {}", format_percent(assumptions.wacc)),
        format!("Terminal Growth Rate: {}", format_percent(assumptions.terminal_growth)),
        format!("Projection Years: {}", assumptions.projection_years),
    ] {
        layer.use_text(line, 12.0, Mm(MARGIN), Mm(y), &fonts.regular);
        y -= 6.5;
    }
    y -= 7.0;

    layer.use_text("Valuation Results:", 16.0, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= 5.0;
    let rows: Vec<(String, String)> = analysis
        .valuation
        .rows()
        .iter()
        .map(|(label, value)| (label.to_string(), format_currency(*value)))
        .collect();
    y = draw_table(&layer, &fonts, &rows, y);
    y -= CHART_GAP;

    for chart in charts {
        let height = CHART_WIDTH * chart.height as f32 / chart.width as f32;
        if y - height < MARGIN {
            layer = new_page(&doc);
            y = CONTENT_TOP;
        }
        y -= height;
        place_chart(&layer, chart, MARGIN, y)?;
        y -= CHART_GAP;
    }

    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_err)?;

    tracing::info!(path = %path.display(), charts = charts.len(), "PDF report generated.");
    Ok(())
}

/// Draws a two-column table with a full grid, top edge at `top`. Returns the
/// y coordinate of its bottom edge.
fn draw_table(layer: &PdfLayerReference, fonts: &Fonts, rows: &[(String, String)], top: f32) -> f32 {
    let left = MARGIN;
    let middle = left + TABLE_LABEL_WIDTH;
    let right = middle + TABLE_VALUE_WIDTH;
    let bottom = top - TABLE_ROW_HEIGHT * rows.len() as f32;

    for (i, (label, value)) in rows.iter().enumerate() {
        let baseline = top - TABLE_ROW_HEIGHT * (i as f32 + 1.0) + 3.8;
        layer.use_text(label.as_str(), 12.0, Mm(left + 3.0), Mm(baseline), &fonts.regular);
        layer.use_text(value.as_str(), 12.0, Mm(middle + 3.0), Mm(baseline), &fonts.regular);
    }

    layer.set_outline_thickness(1.0);
    for i in 0..=rows.len() {
        let y = top - TABLE_ROW_HEIGHT * i as f32;
        layer.add_line(segment((left, y), (right, y)));
    }
    for x in [left, middle, right] {
        layer.add_line(segment((x, top), (x, bottom)));
    }
    bottom
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    }
}

/// Places a chart `CHART_WIDTH` wide with its bottom-left corner at (x, y).
fn place_chart(
    layer: &PdfLayerReference,
    chart: &ChartImage,
    x: f32,
    y: f32,
) -> Result<(), ReportError> {
    let image = Image::from_dynamic_image(&chart.to_dynamic_image()?);
    // At this dpi the bitmap's pixel width maps onto CHART_WIDTH millimetres.
    let dpi = chart.width as f32 * 25.4 / CHART_WIDTH;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    doc.get_page(page).get_layer(layer)
}

fn pdf_err(err: printpdf::Error) -> ReportError {
    ReportError::Pdf(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{
        CashFlowRecord, HistoricalRecord, ProjectedRecord, Projection, ProjectionAssumptions,
        ValuationResult,
    };
    use rust_decimal_macros::dec;

    fn analysis() -> DcfAnalysis {
        let record = HistoricalRecord {
            period: Some("2024".to_string()),
            revenue: dec!(100),
            operating_expenses: dec!(80),
            depreciation: dec!(5),
            capex: dec!(7),
            change_in_working_capital: dec!(2),
        };
        DcfAnalysis {
            assumptions: ProjectionAssumptions::new(dec!(0.10), dec!(0.02), 1).unwrap(),
            history: vec![CashFlowRecord {
                record,
                ebit: dec!(20),
                nopat: dec!(15.8),
                fcf: dec!(11.8),
            }],
            projection: Projection {
                historical_growth: dec!(0.1),
                average_margin: dec!(0.2),
                growth_rates: vec![dec!(0.1)],
                records: vec![ProjectedRecord {
                    year: 1,
                    growth_rate: dec!(0.1),
                    revenue: dec!(110),
                    ebit: dec!(22),
                    fcf: dec!(17.38),
                }],
            },
            valuation: ValuationResult {
                pv_fcf: dec!(15.8),
                terminal_value: dec!(221.595),
                pv_terminal_value: dec!(201.45),
                total_value: dec!(217.25),
            },
        }
    }

    #[test]
    fn report_is_written_with_embedded_charts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dcf_analysis.pdf");
        let chart = ChartImage::from_rgb("chart", 10, 6, vec![200; 180]).unwrap();

        write_dcf_report(&analysis(), &[chart.clone(), chart], &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let err = write_dcf_report(&analysis(), &[], "/no/such/dir/report.pdf").unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
