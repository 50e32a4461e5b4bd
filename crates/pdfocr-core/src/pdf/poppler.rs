//! Page rendering through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace, warn};

use super::{Rasterizer, Result, probe};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// File name prefix handed to pdftoppm; it appends `-<page>.png`.
const PAGE_PREFIX: &str = "page";

/// Rasterizer backed by the `pdftoppm` executable (poppler-utils).
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    pdftoppm: PathBuf,
    page_limit: u32,
}

impl PopplerRasterizer {
    /// Create a rasterizer that runs `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
            page_limit: 0,
        }
    }

    /// Create a rasterizer from PDF configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            pdftoppm: config.pdftoppm_path.clone(),
            page_limit: config.page_limit,
        }
    }

    /// Override the `pdftoppm` executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftoppm = path.into();
        self
    }

    /// Render only the first `page_limit` pages (0 = all).
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    fn render_to(&self, path: &Path, dpi: u32, out_dir: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.pdftoppm);
        cmd.arg("-png").arg("-r").arg(dpi.to_string());
        if self.page_limit > 0 {
            cmd.arg("-l").arg(self.page_limit.to_string());
        }
        cmd.arg(path).arg(out_dir.join(PAGE_PREFIX));

        trace!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            PdfError::Render(format!(
                "failed to run {}: {}. Make sure poppler-utils is installed.",
                self.pdftoppm.display(),
                e
            ))
        })?;

        if !output.status.success() {
            return Err(PdfError::Render(format!(
                "pdftoppm failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for PopplerRasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        // lopdf rejects some files poppler still renders, so a parse failure is not fatal.
        let expected = match probe(path) {
            Ok(info) => Some(info.page_count),
            Err(PdfError::Encrypted) => return Err(PdfError::Encrypted),
            Err(e) => {
                warn!("lopdf could not parse {}: {}. Rendering anyway.", path.display(), e);
                None
            }
        };

        if expected == Some(0) {
            debug!("{} has no pages", path.display());
            return Ok(Vec::new());
        }

        let temp_dir = tempfile::tempdir()?;
        self.render_to(path, dpi, temp_dir.path())?;

        let pages = rendered_pages(temp_dir.path())?;
        if let Some(expected) = expected {
            let expected = match self.page_limit {
                0 => expected,
                max => expected.min(max),
            };
            if pages.len() as u32 != expected {
                warn!(
                    "{}: expected {} rendered pages, found {}",
                    path.display(),
                    expected,
                    pages.len()
                );
            }
        }

        let images = pages
            .iter()
            .map(|(_, page_path)| image::open(page_path).map_err(PdfError::from))
            .collect::<Result<Vec<_>>>()?;

        debug!("Rendered {} pages from {} at {} DPI", images.len(), path.display(), dpi);
        Ok(images)
    }
}

/// Parse the page number pdftoppm appended to a file name.
///
/// pdftoppm zero-pads to the width of the last page number, so `page-7.png`,
/// `page-07.png` and `page-007.png` are all page 7.
fn page_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Rendered page files in `dir`, sorted by page number.
fn rendered_pages(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(page_number) {
            pages.push((number, entry.path()));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::probe::{sample_encrypted_pdf, sample_pdf};

    #[test]
    fn test_page_number_handles_padding() {
        assert_eq!(page_number("page-7.png"), Some(7));
        assert_eq!(page_number("page-07.png"), Some(7));
        assert_eq!(page_number("page-123.png"), Some(123));
        assert_eq!(page_number("page.png"), None);
        assert_eq!(page_number("other-1.png"), None);
        assert_eq!(page_number("page-1.ppm"), None);
    }

    #[test]
    fn test_rendered_pages_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "stray.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let numbers: Vec<u32> = rendered_pages(dir.path())
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(numbers, vec![1, 2, 10]);
    }

    #[test]
    fn test_missing_executable_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(1)).unwrap();

        let rasterizer =
            PopplerRasterizer::new().with_executable(dir.path().join("no-such-pdftoppm"));
        let result = rasterizer.rasterize(&path, 200);
        assert!(matches!(result, Err(PdfError::Render(_))));
    }

    #[test]
    fn test_encrypted_file_is_rejected_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        std::fs::write(&path, sample_encrypted_pdf(1)).unwrap();

        // Rendering would fail with a Render error, so Encrypted means pdftoppm never ran.
        let rasterizer =
            PopplerRasterizer::new().with_executable(dir.path().join("no-such-pdftoppm"));
        assert!(matches!(rasterizer.rasterize(&path, 200), Err(PdfError::Encrypted)));
    }

    /// Stand-in for pdftoppm: records its arguments to `argv.txt` and copies
    /// fixture pages `fixture-<n>.png` (n * 10 pixels wide) to the output
    /// prefix, honoring `-l` like pdftoppm does.
    #[cfg(unix)]
    fn stub_pdftoppm(dir: &Path, pages: u32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        for page in 1..=pages {
            DynamicImage::new_rgb8(page * 10, 1)
                .save(dir.join(format!("fixture-{}.png", page)))
                .unwrap();
        }

        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$@" > '{dir}/argv.txt'
count={pages}
prev=
for arg in "$@"; do
    if [ "$prev" = "-l" ]; then count=$arg; fi
    prev=$arg
done
if [ $count -gt {pages} ]; then count={pages}; fi
i=1
while [ $i -le $count ]; do
    cp '{dir}/fixture-'$i.png "$prev-$i.png"
    i=$((i + 1))
done
"#,
            dir = dir.display(),
            pages = pages
        );

        let path = dir.join("pdftoppm");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn recorded_args(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("argv.txt"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[cfg(unix)]
    fn widths(images: &[DynamicImage]) -> Vec<u32> {
        images.iter().map(|image| image.width()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_renders_all_pages_without_limit_flag() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, sample_pdf(3)).unwrap();

        let rasterizer = PopplerRasterizer::new().with_executable(stub_pdftoppm(dir.path(), 3));
        let images = rasterizer.rasterize(&pdf, 200).unwrap();

        let args = recorded_args(dir.path());
        assert_eq!(&args[..3], &["-png", "-r", "200"]);
        assert!(!args.iter().any(|arg| arg == "-l"));
        assert_eq!(args[3], pdf.display().to_string());
        assert_eq!(widths(&images), vec![10, 20, 30]);
    }

    #[cfg(unix)]
    #[test]
    fn test_page_limit_passes_last_page_flag() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, sample_pdf(3)).unwrap();

        let config = PdfConfig {
            page_limit: 2,
            pdftoppm_path: stub_pdftoppm(dir.path(), 3),
            ..PdfConfig::default()
        };
        let images = PopplerRasterizer::from_config(&config)
            .rasterize(&pdf, 150)
            .unwrap();

        let args = recorded_args(dir.path());
        assert_eq!(&args[..3], &["-png", "-r", "150"]);
        assert!(args.windows(2).any(|pair| pair == ["-l", "2"]));
        // Capped to the first two pages, still in page order.
        assert_eq!(widths(&images), vec![10, 20]);
    }

    #[cfg(unix)]
    #[test]
    fn test_page_limit_above_page_count_renders_everything() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, sample_pdf(2)).unwrap();

        let rasterizer = PopplerRasterizer::new()
            .with_executable(stub_pdftoppm(dir.path(), 2))
            .with_page_limit(5);
        let images = rasterizer.rasterize(&pdf, 200).unwrap();

        assert!(recorded_args(dir.path()).windows(2).any(|pair| pair == ["-l", "5"]));
        assert_eq!(widths(&images), vec![10, 20]);
    }

    #[test]
    #[ignore = "requires poppler-utils"]
    fn test_renders_every_page_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(3)).unwrap();

        let images = PopplerRasterizer::new().rasterize(&path, 72).unwrap();
        assert_eq!(images.len(), 3);
        // US Letter at 72 DPI.
        assert_eq!(images[0].width(), 612);
    }
}
