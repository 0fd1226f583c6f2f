use lopdf::{Document, ObjectId};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct FigureOcr {
    command: String,
    language: String,
}

impl Default for FigureOcr {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl FigureOcr {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        let available = Command::new(&self.command)
            .arg("--version")
            .output()
            .is_ok();

        if !available {
            tracing::debug!(command = %self.command, "tesseract not found; figures will have no OCR text");
        }
        available
    }

    pub fn recognize(&self, image_path: &Path) -> Result<String, String> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| format!("Failed to run {}: {}", self.command, e))?;

        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// The parts of an embedded image XObject needed to decode it.
pub struct RawImage<'a> {
    pub id: ObjectId,
    pub width: i64,
    pub height: i64,
    pub color_space: Option<&'a str>,
    pub filters: &'a [String],
    pub bits_per_component: Option<i64>,
    pub content: &'a [u8],
}

/// Writes an embedded image to `dir` in a format tesseract can read.
///
/// JPEG streams are written as-is; 8-bit RGB and grayscale rasters are
/// re-encoded as PNG. Anything else is reported as unsupported.
pub fn write_image_file(
    doc: &Document,
    raw: &RawImage<'_>,
    dir: &Path,
    name: &str,
) -> Result<PathBuf, String> {
    let filters = raw.filters;

    if filters.iter().any(|f| f == "DCTDecode") {
        let path = dir.join(format!("{name}.jpg"));
        std::fs::write(&path, raw.content).map_err(|e| e.to_string())?;
        return Ok(path);
    }

    if filters.iter().any(|f| f != "FlateDecode") {
        return Err(format!("Unsupported image filters: {:?}", filters));
    }

    if raw.bits_per_component.unwrap_or(8) != 8 {
        return Err(format!(
            "Unsupported bits per component: {:?}",
            raw.bits_per_component
        ));
    }

    let pixels = if filters.is_empty() {
        raw.content.to_vec()
    } else {
        doc.get_object(raw.id)
            .and_then(|object| object.as_stream())
            .and_then(|stream| stream.decompressed_content())
            .map_err(|e| format!("Failed to decompress image: {}", e))?
    };

    let width = u32::try_from(raw.width).map_err(|e| e.to_string())?;
    let height = u32::try_from(raw.height).map_err(|e| e.to_string())?;
    let path = dir.join(format!("{name}.png"));

    match raw.color_space {
        Some("DeviceRGB") => image::RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| "RGB buffer does not match image size".to_string())?
            .save(&path)
            .map_err(|e| e.to_string())?,
        Some("DeviceGray") => image::GrayImage::from_raw(width, height, pixels)
            .ok_or_else(|| "Gray buffer does not match image size".to_string())?
            .save(&path)
            .map_err(|e| e.to_string())?,
        other => return Err(format!("Unsupported color space: {:?}", other)),
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    fn image_stream(width: i64, height: i64, color_space: &str, pixels: Vec<u8>) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
            },
            pixels,
        )
    }

    fn raw_image<'a>(
        id: ObjectId,
        stream: &'a Stream,
        color_space: &'a str,
        filters: &'a [String],
    ) -> RawImage<'a> {
        RawImage {
            id,
            width: stream.dict.get(b"Width").unwrap().as_i64().unwrap(),
            height: stream.dict.get(b"Height").unwrap().as_i64().unwrap(),
            color_space: Some(color_space),
            filters,
            bits_per_component: Some(8),
            content: &stream.content,
        }
    }

    #[test]
    fn test_raw_gray_image_becomes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::with_version("1.5");
        let stream = image_stream(2, 3, "DeviceGray", vec![0, 50, 100, 150, 200, 250]);
        let id = doc.add_object(stream.clone());

        let path = write_image_file(&doc, &raw_image(id, &stream, "DeviceGray", &[]), dir.path(), "page_1_figure_1")
            .unwrap();

        assert_eq!(path.extension().unwrap(), "png");
        let png = image::open(&path).unwrap().into_luma8();
        assert_eq!(png.dimensions(), (2, 3));
        assert_eq!(png.get_pixel(1, 2).0, [250]);
    }

    #[test]
    fn test_flate_rgb_image_is_decompressed() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::with_version("1.5");
        let pixels: Vec<u8> = [10u8, 20, 30].repeat(16 * 16);
        let mut stream = image_stream(16, 16, "DeviceRGB", pixels);
        stream.compress().unwrap();
        assert!(stream.dict.get(b"Filter").is_ok());
        let id = doc.add_object(stream.clone());
        let filters = vec!["FlateDecode".to_string()];

        let path = write_image_file(&doc, &raw_image(id, &stream, "DeviceRGB", &filters), dir.path(), "fig")
            .unwrap();

        let png = image::open(&path).unwrap().into_rgb8();
        assert_eq!(png.dimensions(), (16, 16));
        assert_eq!(png.get_pixel(15, 15).0, [10, 20, 30]);
    }

    #[test]
    fn test_jpeg_stream_is_written_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let mut jpeg = Vec::new();
        image::GrayImage::from_pixel(4, 4, image::Luma([128]))
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let mut doc = Document::with_version("1.5");
        let stream = image_stream(4, 4, "DeviceGray", jpeg.clone());
        let id = doc.add_object(stream.clone());
        let filters = vec!["DCTDecode".to_string()];

        let path = write_image_file(&doc, &raw_image(id, &stream, "DeviceGray", &filters), dir.path(), "fig")
            .unwrap();

        assert_eq!(path.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(&path).unwrap(), jpeg);
        assert_eq!(image::open(&path).unwrap().into_luma8().dimensions(), (4, 4));
    }

    #[test]
    fn test_unsupported_color_space_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::with_version("1.5");
        let stream = image_stream(1, 1, "DeviceCMYK", vec![0, 0, 0, 0]);
        let id = doc.add_object(stream.clone());

        let err = write_image_file(&doc, &raw_image(id, &stream, "DeviceCMYK", &[]), dir.path(), "fig")
            .unwrap_err();

        assert!(err.contains("Unsupported color space"));
    }

    #[test]
    fn test_missing_command_is_unavailable() {
        let ocr = FigureOcr::new("definitely-not-a-real-ocr-binary", "eng");
        assert!(!ocr.is_available());
    }

    #[test]
    fn test_missing_command_fails_recognition() {
        let ocr = FigureOcr::new("definitely-not-a-real-ocr-binary", "eng");
        let result = ocr.recognize(Path::new("/nonexistent.png"));
        assert!(result.unwrap_err().contains("Failed to run"));
    }
}
