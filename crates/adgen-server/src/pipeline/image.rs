use anyhow::{bail, Result};

/// Container formats recognised from their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl ImageFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::WebP => "WebP",
            ImageFormat::Bmp => "BMP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub size_bytes: usize,
    pub dimensions: Option<(u32, u32)>,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

impl ImageInfo {
    /// Identify the image from its header. Fails for anything that is not a
    /// supported image, regardless of the declared content type.
    pub fn sniff(data: &[u8]) -> Result<Self> {
        let (format, dimensions) = if data.starts_with(PNG_SIGNATURE) {
            (ImageFormat::Png, png_dimensions(data))
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            (ImageFormat::Jpeg, None)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            (ImageFormat::Gif, gif_dimensions(data))
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            (ImageFormat::WebP, None)
        } else if data.starts_with(b"BM") && data.len() >= 26 {
            (ImageFormat::Bmp, bmp_dimensions(data))
        } else if data.is_empty() {
            bail!("empty file");
        } else {
            bail!("unrecognized image format");
        };

        Ok(Self {
            format,
            size_bytes: data.len(),
            dimensions,
        })
    }

    pub fn human_size(&self) -> String {
        const UNITS: [&str; 3] = ["KB", "MB", "GB"];

        if self.size_bytes < 1024 {
            return format!("{} B", self.size_bytes);
        }
        let mut size = self.size_bytes as f64;
        let mut unit = "B";
        for next in UNITS {
            if size < 1024.0 {
                break;
            }
            size /= 1024.0;
            unit = next;
        }
        format!("{:.1} {}", size, unit)
    }
}

fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    // IHDR is always the first chunk: length(4) type(4) width(4) height(4).
    if data.len() < 24 || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    Some((width, height))
}

fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 10 {
        return None;
    }
    let width = u16::from_le_bytes([data[6], data[7]]);
    let height = u16::from_le_bytes([data[8], data[9]]);
    Some((width.into(), height.into()))
}

fn bmp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let width = i32::from_le_bytes(data[18..22].try_into().ok()?);
    let height = i32::from_le_bytes(data[22..26].try_into().ok()?);
    // Negative height marks a top-down bitmap.
    Some((width.unsigned_abs(), height.unsigned_abs()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest header `sniff` recognises as a PNG of the given size.
    pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    #[test]
    fn test_sniff_png() {
        let info = ImageInfo::sniff(&png_header(800, 600)).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(info.dimensions, Some((800, 600)));
        assert_eq!(info.size_bytes, 29);
    }

    #[test]
    fn test_sniff_gif_and_jpeg() {
        let mut gif = b"GIF89a".to_vec();
        gif.extend_from_slice(&[0x40, 0x01, 0xF0, 0x00]);
        let info = ImageInfo::sniff(&gif).unwrap();
        assert_eq!(info.format, ImageFormat::Gif);
        assert_eq!(info.dimensions, Some((320, 240)));

        let info = ImageInfo::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap();
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!(info.dimensions, None);
    }

    #[test]
    fn test_sniff_rejects_text() {
        let err = ImageInfo::sniff(b"just some text").unwrap_err();
        assert_eq!(err.to_string(), "unrecognized image format");

        let err = ImageInfo::sniff(&[]).unwrap_err();
        assert_eq!(err.to_string(), "empty file");
    }

    #[test]
    fn test_human_size() {
        let info = |size_bytes| ImageInfo {
            format: ImageFormat::Png,
            size_bytes,
            dimensions: None,
        };
        assert_eq!(info(512).human_size(), "512 B");
        assert_eq!(info(2048).human_size(), "2.0 KB");
        assert_eq!(info(3 * 1024 * 1024).human_size(), "3.0 MB");
    }
}
