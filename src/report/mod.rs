//! Score report export.
//!
//! A finished session's score screen is captured from the last drawn frame,
//! rasterized, and written as a one-page PDF under a fixed file name.

mod canvas;
mod font;
mod pdf;

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::models::QuizSession;

pub use canvas::{Canvas, Rasterize, RegionHandle, RegionMap, CELL_HEIGHT, CELL_WIDTH};
pub use pdf::{display_height, PageFormat};

/// File name every report is saved under.
pub const REPORT_FILE_NAME: &str = "download.pdf";

/// Region the score screen registers for export.
pub const SCORE_REGION: &str = "score-report";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export target `{0}` was not rendered")]
    TargetMissing(RegionHandle),
    #[error("the quiz is not finished yet")]
    NotFinished,
    #[error("failed to encode report image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("invalid report image: {0}")]
    InvalidImage(&'static str),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("export worker failed: {0}")]
    Join(#[from] JoinError),
}

/// What a successful export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub display_width_mm: f64,
    pub display_height_mm: f64,
}

/// Writes score reports into a directory.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
    page: PageFormat,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            page: PageFormat::A4,
        }
    }

    pub fn with_page_format(mut self, page: PageFormat) -> Self {
        self.page = page;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    /// Capture `region` from `source` and save it as the report document.
    ///
    /// Nothing is written unless every step succeeds. Failures are logged
    /// before being returned.
    pub async fn export<R>(
        &self,
        source: R,
        region: RegionHandle,
        session: &QuizSession,
    ) -> Result<ExportReport, ExportError>
    where
        R: Rasterize + Send + 'static,
    {
        let result = self.run(source, region, session).await;
        match &result {
            Ok(report) => info!(
                path = %report.path.display(),
                width = report.pixel_width,
                height = report.pixel_height,
                "exported score report"
            ),
            Err(err) => error!(error = %err, "score report export failed"),
        }
        result
    }

    async fn run<R>(
        &self,
        source: R,
        region: RegionHandle,
        session: &QuizSession,
    ) -> Result<ExportReport, ExportError>
    where
        R: Rasterize + Send + 'static,
    {
        if !session.is_finished() {
            return Err(ExportError::NotFinished);
        }

        let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ExportError> {
            let image = source.rasterize(&region)?;
            let mut png = Vec::new();
            image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
            Ok(png)
        })
        .await??;

        let image = pdf::PngImage::from_png(&png)?;
        let placement = pdf::Placement {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: self.page.width_mm,
            height_mm: display_height(image.width, image.height, self.page.width_mm),
        };
        let document = pdf::single_image_document(self.page, &image, placement);

        let path = self.output_path();
        write_document(&self.output_dir, &path, &document).await?;

        Ok(ExportReport {
            path,
            pixel_width: image.width,
            pixel_height: image.height,
            display_width_mm: placement.width_mm,
            display_height_mm: placement.height_mm,
        })
    }
}

async fn write_document(dir: &Path, path: &Path, document: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    tokio::fs::write(path, document).await.map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::{Rgb, RgbImage};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    use crate::machine::QuizMachine;
    use crate::models::{Question, QuestionBank};

    fn finished_session() -> QuizSession {
        let mut quiz = QuizMachine::new(QuestionBank::new(vec![
            Question::new("Q1", ["A", "B"], "A"),
            Question::new("Q2", ["C", "D"], "D"),
        ]));
        quiz.submit_answer("A").unwrap();
        quiz.advance().unwrap();
        quiz.submit_answer("C").unwrap();
        quiz.advance().unwrap();
        quiz.session().clone()
    }

    fn score_canvas() -> Canvas {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 20, 4));
        buffer.set_string(0, 0, "Score 1 / 2", Style::default());
        let mut regions = RegionMap::new();
        regions.register(RegionHandle::new(SCORE_REGION), Rect::new(0, 0, 20, 2));
        Canvas::capture(&buffer, regions)
    }

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle.as_bytes())
            .count()
    }

    struct Solid(u32, u32);

    impl Rasterize for Solid {
        fn rasterize(&self, _: &RegionHandle) -> Result<RgbImage, ExportError> {
            Ok(RgbImage::from_pixel(self.0, self.1, Rgb([0, 0, 0])))
        }
    }

    #[tokio::test]
    async fn test_export_writes_one_page_with_one_image() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());

        let report = exporter
            .export(score_canvas(), RegionHandle::new(SCORE_REGION), &finished_session())
            .await
            .unwrap();

        assert_eq!(report.path, dir.path().join(REPORT_FILE_NAME));
        assert_eq!(report.pixel_width, 20 * CELL_WIDTH);
        assert_eq!(report.pixel_height, 2 * CELL_HEIGHT);
        assert_eq!(report.display_width_mm, 210.0);
        assert_eq!(report.display_height_mm, 28.0);

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let bytes = std::fs::read(&report.path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(count(&bytes, "/Type /Page "), 1);
        assert_eq!(count(&bytes, "/Subtype /Image"), 1);
    }

    #[tokio::test]
    async fn test_export_missing_target_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());

        let err = exporter
            .export(score_canvas(), RegionHandle::new("elsewhere"), &finished_session())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::TargetMissing(_)));
        assert!(!exporter.output_path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_requires_finished_session() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());
        let session = QuizSession::start(2);

        let err = exporter
            .export(Solid(4, 4), RegionHandle::new(SCORE_REGION), &session)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::NotFinished));
        assert!(!exporter.output_path().exists());
    }

    #[tokio::test]
    async fn test_export_scales_tall_images_to_page_width() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path().join("reports"));

        let report = exporter
            .export(Solid(100, 300), RegionHandle::new(SCORE_REGION), &finished_session())
            .await
            .unwrap();

        assert_eq!(report.display_height_mm, 630.0);
        assert!(report.path.exists());
    }

    #[tokio::test]
    async fn test_second_export_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());
        let session = finished_session();
        let region = RegionHandle::new(SCORE_REGION);

        exporter.export(Solid(8, 8), region.clone(), &session).await.unwrap();
        exporter.export(Solid(16, 8), region, &session).await.unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_custom_page_format() {
        let dir = tempfile::tempdir().unwrap();
        let letter = PageFormat {
            width_mm: 215.9,
            height_mm: 279.4,
        };
        let exporter = ReportExporter::new(dir.path()).with_page_format(letter);

        let report = exporter
            .export(Solid(200, 100), RegionHandle::new(SCORE_REGION), &finished_session())
            .await
            .unwrap();

        assert_eq!(report.display_width_mm, 215.9);
        assert!((report.display_height_mm - 107.95).abs() < 1e-9);
        assert_eq!(exporter.output_dir(), dir.path());
    }
}
