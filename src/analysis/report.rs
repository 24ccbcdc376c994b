//! Report artifacts for one analyzed sheet: detection overlay, per-line
//! count table and the JSON assessment document.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;

use crate::analysis::pipeline::PageAnalysis;
use crate::core::errors::PalographError;
use crate::core::roi::RoiRect;
use crate::domain::stroke::Line;

/// Line colors cycled per detected writing line.
const LINE_COLORS: [Rgb<u8>; 4] = [
    Rgb([220, 40, 40]),
    Rgb([40, 160, 40]),
    Rgb([40, 80, 220]),
    Rgb([200, 140, 20]),
];

/// ROI frame color.
const ROI_COLOR: Rgb<u8> = Rgb([130, 40, 180]);

/// Draws each detected stroke box onto a copy of the aligned page,
/// one color per line, plus the analyzed ROI frame.
pub fn draw_detection_overlay(
    aligned: &RgbImage,
    global_lines: &[Line],
    roi_rect: RoiRect,
) -> RgbImage {
    let mut canvas = aligned.clone();

    for (idx, line) in global_lines.iter().enumerate() {
        let color = LINE_COLORS[idx % LINE_COLORS.len()];
        for stroke in &line.strokes {
            let rect = Rect::at(stroke.x as i32, stroke.y as i32)
                .of_size(stroke.width.max(1), stroke.height.max(1));
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }

    if roi_rect.width() > 0 && roi_rect.height() > 0 {
        let frame = Rect::at(roi_rect.x1 as i32, roi_rect.y1 as i32)
            .of_size(roi_rect.width(), roi_rect.height());
        draw_hollow_rect_mut(&mut canvas, frame, ROI_COLOR);
    }

    canvas
}

/// Writes the per-line stroke counts as a two-column CSV.
pub fn save_line_counts_csv(
    path: impl AsRef<Path>,
    line_counts: &[u32],
) -> Result<(), PalographError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["line_index", "count"])?;
    for (idx, count) in line_counts.iter().enumerate() {
        writer.write_record([(idx + 1).to_string(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// JSON layout of the saved result document.
#[derive(serde::Serialize)]
struct ResultDocument<'a> {
    line_counts: &'a [u32],
    roi: RoiRect,
    result: &'a crate::domain::metrics::AssessmentResult,
}

/// Writes the assessment document as pretty-printed JSON, together with
/// the per-line counts and the analyzed ROI.
pub fn save_result_json(
    path: impl AsRef<Path>,
    analysis: &PageAnalysis,
) -> Result<(), PalographError> {
    let document = ResultDocument {
        line_counts: &analysis.line_counts,
        roi: analysis.roi_rect,
        result: &analysis.result,
    };
    let text = serde_json::to_string_pretty(&document)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}

/// Writes the full artifact set for one sheet into `dir`, prefixed by
/// `stem`: the rectified page, the analyzed region, the binary mask,
/// the detection overlay, the counts CSV and the JSON document.
pub fn save_artifacts(
    dir: impl AsRef<Path>,
    stem: &str,
    analysis: &PageAnalysis,
) -> Result<(), PalographError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let file = |suffix: &str| dir.join(format!("{stem}_{suffix}"));

    analysis.aligned.save(file("aligned.png"))?;
    analysis.region.save(file("roi.png"))?;
    analysis.binary.save(file("binary.png"))?;

    let overlay =
        draw_detection_overlay(&analysis.aligned, &analysis.global_lines, analysis.roi_rect);
    overlay.save(file("overlay.png"))?;

    save_line_counts_csv(file("counts.csv"), &analysis.line_counts)?;
    save_result_json(file("result.json"), analysis)?;

    tracing::info!(dir = %dir.display(), stem, "artifacts written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stroke::Stroke;

    fn one_line() -> Vec<Line> {
        let strokes = vec![
            Stroke::new(10, 20, 3, 30, 90, 90.0),
            Stroke::new(30, 21, 3, 29, 87, 90.0),
            Stroke::new(50, 19, 4, 31, 95, 89.0),
        ];
        let center_y = strokes.iter().map(|s| s.center_y).sum::<f64>() / strokes.len() as f64;
        vec![Line { strokes, center_y, tolerance: 18.0 }]
    }

    #[test]
    fn overlay_marks_stroke_borders() {
        let aligned = RgbImage::from_pixel(200, 120, Rgb([255, 255, 255]));
        let roi = RoiRect { x1: 5, y1: 5, x2: 195, y2: 115 };
        let overlay = draw_detection_overlay(&aligned, &one_line(), roi);

        assert_eq!(overlay.dimensions(), aligned.dimensions());
        // Top-left corner of the first stroke box carries the first color.
        assert_eq!(*overlay.get_pixel(10, 20), LINE_COLORS[0]);
        // The ROI frame corner carries the frame color.
        assert_eq!(*overlay.get_pixel(5, 5), ROI_COLOR);
        // Pixels inside a stroke box stay untouched.
        assert_eq!(*overlay.get_pixel(11, 30), Rgb([255, 255, 255]));
    }

    #[test]
    fn counts_csv_has_header_and_one_row_per_line() -> Result<(), PalographError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("counts.csv");
        save_line_counts_csv(&path, &[18, 20, 17])?;

        let text = std::fs::read_to_string(&path)?;
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], "line_index,count");
        assert_eq!(rows[1], "1,18");
        assert_eq!(rows[3], "3,17");
        assert_eq!(rows.len(), 4);
        Ok(())
    }
}
