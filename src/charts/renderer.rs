//! Static Chart Renderer
//! Renders the stacked histograms to PNG with plotters, for export.
//!
//! Layout:
//! 1. Title centered at the top
//! 2. Stacked bars, one per category, one color per series
//! 3. Series legend in the upper right corner

use crate::charts::plotter::{series_label, PALETTE};
use crate::export::ExportError;
use crate::stats::GroupedCounts;
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 700;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a stacked histogram to PNG bytes.
    pub fn render_histogram_png(
        counts: &GroupedCounts,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ExportError> {
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
        Self::draw_histogram(&mut buffer, counts, title, width, height)
            .map_err(|e| ExportError::Chart(e.to_string()))?;

        Self::encode_png(buffer, width, height)
    }

    /// Encode a packed RGB buffer as PNG.
    fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| ExportError::Chart("bitmap size mismatch".to_string()))?;
        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, ImageFormat::Png)
            .map_err(|e| ExportError::Chart(e.to_string()))?;

        Ok(png.into_inner())
    }

    fn draw_histogram(
        buffer: &mut [u8],
        counts: &GroupedCounts,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n_categories = counts.categories.len().max(1) as u32;
        let y_max = (counts.max_category_total() as u32).max(1) + 1;
        let labels = counts.categories.clone();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28).into_font())
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d((0u32..n_categories).into_segmented(), 0u32..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Faltas")
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        let mut base = vec![0u32; counts.categories.len()];
        for (series_idx, series) in counts.series.iter().enumerate() {
            let (r, g, b) = PALETTE[series_idx % PALETTE.len()];
            let color = RGBColor(r, g, b);

            let mut bars = Vec::new();
            for (i, category) in counts.categories.iter().enumerate() {
                let n = counts.count(category, series) as u32;
                if n == 0 {
                    continue;
                }
                let x = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(x), base[i]),
                        (SegmentValue::Exact(x + 1), base[i] + n),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bars.push(bar);
                base[i] += n;
            }

            chart
                .draw_series(bars)?
                .label(series_label(series))
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AbsenceRecord, AbsenceTable};
    use chrono::NaiveDate;

    #[test]
    fn test_encode_png_keeps_size() {
        let bytes = StaticChartRenderer::encode_png(vec![255u8; 40 * 30 * 3], 40, 30).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (40, 30));
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        let result = StaticChartRenderer::encode_png(vec![0u8; 10], 40, 30);
        assert!(matches!(result, Err(ExportError::Chart(_))));
    }

    #[test]
    #[ignore = "needs system fonts through fontconfig"]
    fn test_render_empty_counts_produces_png() {
        let bytes = StaticChartRenderer::render_histogram_png(
            &GroupedCounts::default(),
            "Faltas por Motivo",
            320,
            200,
        )
        .unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    #[ignore = "needs system fonts through fontconfig"]
    fn test_render_bitmap_has_requested_size() {
        let day = |m| NaiveDate::from_ymd_opt(2024, m, 3);
        let table: AbsenceTable = vec![
            AbsenceRecord::new("", "Ana", "A", day(1), "Doença", ""),
            AbsenceRecord::new("", "Bia", "B", day(2), "Doença", ""),
        ]
        .into_iter()
        .collect();
        let counts = GroupedCounts::by_month_and_sector(&table);

        let bytes = StaticChartRenderer::render_histogram_png(&counts, "Faltas por Mês", 400, 300)
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (400, 300));
    }
}
