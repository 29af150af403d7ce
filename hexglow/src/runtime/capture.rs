use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{error, info};

/// `hexglow-<unix millis>.png` under `dir`
pub fn capture_path(dir: &Path) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    dir.join(format!("hexglow-{}.png", millis))
}

/// Writes straight-alpha RGBA8 pixels as a PNG, creating parent directories
/// as needed.
pub fn save_png(
    path: &Path,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), String> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || rgba.len() != expected {
        return Err(format!(
            "expected {} bytes for a {}x{} image, got {}",
            expected,
            width,
            height,
            rgba.len()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!("failed to create '{}': {}", parent.display(), err)
        })?;
    }

    let file = fs::File::create(path).map_err(|err| {
        format!("failed to create '{}': {}", path.display(), err)
    })?;
    let mut writer = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(&mut writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    encoder.set_filter(png::Filter::Sub);
    let mut png_writer = encoder
        .write_header()
        .map_err(|err| format!("png header failed: {}", err))?;
    png_writer
        .write_image_data(rgba)
        .map_err(|err| format!("png write failed: {}", err))?;
    drop(png_writer);
    writer
        .flush()
        .map_err(|err| format!("png flush failed: {}", err))?;

    Ok(())
}

/// Encodes on a background thread so the event loop never waits on disk
pub fn queue_png_save(path: PathBuf, width: u32, height: u32, rgba: Vec<u8>) {
    thread::spawn(move || match save_png(&path, width, height, &rgba) {
        Ok(()) => info!("Image saved to {:?}", path),
        Err(err) => error!("Failed to save image capture: {}", err),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots").join("frame.png");
        let rgba = [255u8, 0, 0, 255].repeat(4 * 3);

        save_png(&path, 4, 3, &rgba).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        assert!(save_png(&path, 4, 3, &[0u8; 10]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_capture_path_is_png_in_dir() {
        let path = capture_path(Path::new("/tmp/shots"));
        assert!(path.starts_with("/tmp/shots"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }
}
