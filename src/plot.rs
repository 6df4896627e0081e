//! SVG chart rendering
//!
//! Correlation heatmap and monthly line charts, written with the plotters
//! SVG backend.

use crate::correlation::CorrelationMatrix;
use crate::data::table::ExchangeRateTable;
use crate::error::{AnalysisError, Result};
use chrono::Datelike;
use log::info;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::path::{Path, PathBuf};

const HEATMAP_CELL: u32 = 48;
const HEATMAP_MARGIN: u32 = 180;
const LINE_CHART_SIZE: (u32, u32) = (1200, 400);

fn plot_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::PlotError(e.to_string())
}

/// Diverging blue-white-red scale over [-1, 1]
pub fn diverging_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let r = r.clamp(-1.0, 1.0);
    let blend = |from: u8, to: u8, t: f64| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    let (cold, warm) = ((59, 76, 192), (180, 4, 38));
    if r < 0.0 {
        let t = -r;
        RGBColor(blend(245, cold.0, t), blend(245, cold.1, t), blend(245, cold.2, t))
    } else {
        RGBColor(blend(245, warm.0, r), blend(245, warm.1, r), blend(245, warm.2, r))
    }
}

/// Annotated correlation heatmap
///
/// The `highlight` label's row and column are outlined in green.
pub fn render_heatmap(matrix: &CorrelationMatrix, highlight: Option<&str>, path: &Path) -> Result<()> {
    let n = matrix.len();
    let side = HEATMAP_MARGIN + HEATMAP_CELL * n as u32 + 20;
    let root = SVGBackend::new(path, (side, side)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    root.draw(&Text::new(
        "Correlation Matrix",
        ((side / 2) as i32 - 80, 10),
        ("sans-serif", 22),
    ))
    .map_err(plot_err)?;

    let origin = HEATMAP_MARGIN as i32;
    let cell = HEATMAP_CELL as i32;
    let label_style = ("sans-serif", 11).into_font();

    for (i, label) in matrix.labels().iter().enumerate() {
        let offset = origin + cell * i as i32;
        root.draw(&Text::new(label.clone(), (8, offset + cell / 2 - 5), label_style.clone()))
            .map_err(plot_err)?;
        root.draw(&Text::new(
            label.clone(),
            (offset + 4, origin - 14),
            label_style.clone().transform(FontTransform::Rotate270),
        ))
        .map_err(plot_err)?;
    }

    for (i, row) in matrix.rows().iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let x0 = origin + cell * j as i32;
            let y0 = origin + cell * i as i32;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell, y0 + cell)],
                diverging_color(r).filled(),
            ))
            .map_err(plot_err)?;
            let text = if r.is_nan() { "nan".to_string() } else { format!("{:.2}", r) };
            root.draw(&Text::new(text, (x0 + 8, y0 + cell / 2 - 5), ("sans-serif", 11)))
                .map_err(plot_err)?;
        }
    }

    if let Some(label) = highlight {
        if let Some(idx) = matrix.labels().iter().position(|l| l == label) {
            let start = origin + cell * idx as i32;
            let end = origin + cell * n as i32;
            let green = GREEN.stroke_width(3);
            root.draw(&Rectangle::new([(start, origin), (start + cell, end)], green))
                .map_err(plot_err)?;
            root.draw(&Rectangle::new([(origin, start), (end, start + cell)], green))
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)?;
    info!("Wrote heatmap to {}", path.display());
    Ok(())
}

/// Line chart of one column against its dates
pub fn render_series(table: &ExchangeRateTable, column: &str, path: &Path) -> Result<()> {
    let series = table.column(column)?;
    let points: Vec<(f64, f64)> = table
        .dates()
        .iter()
        .zip(&series.values)
        .filter_map(|(d, v)| Some((fractional_year(*d), (*v)?)))
        .collect();

    if points.is_empty() {
        return Err(AnalysisError::DataError(format!(
            "no values to plot for '{}'",
            column
        )));
    }

    let (x_min, x_max) = bounds(points.iter().map(|p| p.0));
    let (y_min, y_max) = bounds(points.iter().map(|p| p.1));
    let y_pad = ((y_max - y_min) * 0.05).max(1e-9);

    let root = SVGBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Monthly Exchange Rates for {}", column), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max.max(x_min + 1.0 / 12.0), (y_min - y_pad)..(y_max + y_pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(format!("{} Rate", column))
        .x_label_formatter(&|x| format!("{:.0}", x.floor()))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(plot_err)?
        .label(column)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!("Wrote {} chart to {}", column, path.display());
    Ok(())
}

/// One chart per column under `dir`; returns the written paths
pub fn render_monthly_charts(
    monthly: &ExchangeRateTable,
    columns: &[&str],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    columns
        .iter()
        .map(|column| {
            let path = dir.join(format!("monthly_{}.svg", file_stem(column)));
            render_series(monthly, column, &path)?;
            Ok(path)
        })
        .collect()
}

/// File-name-safe form of a column name
pub fn file_stem(column: &str) -> String {
    column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn fractional_year(date: chrono::NaiveDate) -> f64 {
    date.year() as f64 + (date.ordinal0() as f64) / 366.0
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Series;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn monthly() -> ExchangeRateTable {
        let dates = (1..=12)
            .map(|m| NaiveDate::from_ymd_opt(2020, m, 28).unwrap())
            .collect();
        let values: Vec<f64> = (0..12).map(|i| 70.0 + i as f64 * 0.5).collect();
        ExchangeRateTable::new(dates, vec![Series::from_values("USDINR Curncy", &values)]).unwrap()
    }

    #[test]
    fn test_diverging_color_ends() {
        assert_eq!(diverging_color(1.0).rgb(), (180, 4, 38));
        assert_eq!(diverging_color(-1.0).rgb(), (59, 76, 192));
        assert_eq!(diverging_color(0.0).rgb(), (245, 245, 245));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("USDINR Curncy"), "usdinr_curncy");
    }

    #[test]
    fn test_render_monthly_charts() {
        let dir = tempdir().unwrap();
        let paths = render_monthly_charts(&monthly(), &["USDINR Curncy"], dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        let svg = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Monthly Exchange Rates for USDINR Curncy"));
    }

    #[test]
    fn test_render_heatmap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heatmap.svg");
        let table = monthly();
        let matrix = CorrelationMatrix::compute_all(&table).unwrap();
        render_heatmap(&matrix, Some("USDINR Curncy"), &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Correlation Matrix"));
        assert!(svg.contains("1.00"));
    }

    #[test]
    fn test_render_unknown_column_fails() {
        let dir = tempdir().unwrap();
        let err = render_series(&monthly(), "DXY Curncy", &dir.path().join("x.svg")).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(_)));
    }
}
