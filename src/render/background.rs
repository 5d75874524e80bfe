//! Background image loading.

use std::path::Path;

use image::RgbaImage;

use crate::error::BackgroundError;

/// Decode an image file into RGBA pixels.
pub fn load_background(path: &Path) -> Result<RgbaImage, BackgroundError> {
    let bytes = std::fs::read(path)?;
    let image = image::load_from_memory(&bytes)?;
    log::debug!(
        "Loaded background {:?} ({}x{})",
        path,
        image.width(),
        image.height()
    );
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_background(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, BackgroundError::Io(_)));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let path = std::env::temp_dir().join(format!("filla-garbage-{}.png", std::process::id()));
        std::fs::write(&path, b"not an image").expect("write");
        let err = load_background(&path).unwrap_err();
        assert!(matches!(err, BackgroundError::Decode(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_png_round_trip() {
        let path = std::env::temp_dir().join(format!("filla-bg-{}.png", std::process::id()));
        RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .expect("save");
        let loaded = load_background(&path).expect("load");
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [10, 20, 30, 255]);
        let _ = std::fs::remove_file(&path);
    }
}
