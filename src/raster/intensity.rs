use image::imageops::FilterType;
use image::GrayImage;
use std::path::Path;

use crate::config::ImageConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::model::IntensityProfile;

/// Load an image, squash it to the configured resolution (aspect ratio is
/// not preserved), convert to luma and keep the brightest pixel per column.
pub fn extract(path: &Path, cfg: &ImageConfig) -> PipelineResult<IntensityProfile> {
    let decoded = image::open(path).map_err(|source| PipelineError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Loaded image {}x{}, resizing to {}x{}",
        decoded.width(),
        decoded.height(),
        cfg.width,
        cfg.height
    );

    let gray = decoded
        .resize_exact(cfg.width, cfg.height, FilterType::Triangle)
        .to_luma8();

    Ok(column_peaks(&gray, cfg.width_cap))
}

/// Brightest luma per column, scanning at most `cap` columns from the left.
pub fn column_peaks(gray: &GrayImage, cap: u32) -> IntensityProfile {
    let (width, height) = gray.dimensions();
    let columns = (0..width.min(cap))
        .map(|x| {
            (0..height)
                .map(|y| gray.get_pixel(x, y)[0])
                .max()
                .unwrap_or(0)
        })
        .collect();
    IntensityProfile { columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn column_peak_is_brightest_row() {
        let mut gray = GrayImage::new(3, 4);
        gray.put_pixel(0, 2, Luma([17]));
        gray.put_pixel(1, 0, Luma([200]));
        gray.put_pixel(1, 3, Luma([90]));
        gray.put_pixel(2, 3, Luma([255]));
        let profile = column_peaks(&gray, 250);
        assert_eq!(profile.columns, vec![17, 200, 255]);
    }

    #[test]
    fn any_source_size_yields_250_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        let img = RgbImage::from_fn(640, 37, |x, y| Rgb([(x % 256) as u8, (y * 5) as u8, 40]));
        img.save(&path).unwrap();

        let profile = extract(&path, &ImageConfig::default()).unwrap();
        assert_eq!(profile.columns.len(), 250);
    }

    #[test]
    fn wider_resize_is_capped_at_250_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        let img = RgbImage::from_fn(400, 20, |x, _| Rgb([if x < 250 { 0 } else { 255 }, 0, 0]));
        img.save(&path).unwrap();

        let cfg = ImageConfig { width: 400, height: 20, ..Default::default() };
        let profile = extract(&path, &cfg).unwrap();
        assert_eq!(profile.columns.len(), 250);
        assert_eq!(column_peaks(&GrayImage::new(400, 1), 250).columns.len(), 250);
    }

    #[test]
    fn narrow_resize_keeps_every_column() {
        let profile = column_peaks(&GrayImage::new(120, 3), 250);
        assert_eq!(profile.columns.len(), 120);
    }

    #[test]
    fn black_image_has_zero_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("black.png");
        RgbImage::new(250, 250).save(&path).unwrap();

        let profile = extract(&path, &ImageConfig::default()).unwrap();
        assert_eq!(profile.columns.len(), 250);
        assert!(profile.columns.iter().all(|&v| v == 0));
    }

    #[test]
    fn white_stripe_lights_its_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripe.bmp");
        let img = RgbImage::from_fn(250, 250, |x, _| {
            if (100..150).contains(&x) { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        });
        img.save(&path).unwrap();

        let profile = extract(&path, &ImageConfig::default()).unwrap();
        assert_eq!(profile.columns[125], 255);
        assert_eq!(profile.columns[10], 0);
        assert_eq!(profile.columns[240], 0);
    }

    #[test]
    fn missing_file_is_image_load_error() {
        let err = extract(Path::new("/definitely/not/here.png"), &ImageConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::ImageLoad { .. }));
    }

    #[test]
    fn garbage_bytes_are_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not a png").unwrap();
        let err = extract(&path, &ImageConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::ImageLoad { .. }));
    }
}
