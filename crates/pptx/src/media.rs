//! Embedded image handling.

/// Image formats that can be embedded in a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Every supported format.
    pub const ALL: [ImageFormat; 4] = [Self::Png, Self::Jpeg, Self::Gif, Self::Bmp];

    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }

    /// Get the file extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    /// Detect the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if bytes.len() > 14 && bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        None
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// An image ready to be written as a media part.
#[derive(Debug, Clone)]
pub(crate) struct EmbeddedImage<'a> {
    pub data: &'a [u8],
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl<'a> EmbeddedImage<'a> {
    /// Prepare bytes for embedding.
    ///
    /// The bytes must carry a known signature and decode completely;
    /// truncated or corrupt payloads are rejected.
    pub fn prepare(data: &'a [u8]) -> Result<Self, String> {
        let format = ImageFormat::detect(data).ok_or_else(|| {
            format!(
                "unrecognised image data ({} bytes, header {:02X?})",
                data.len(),
                &data[..data.len().min(4)]
            )
        })?;
        let decoded = image::load_from_memory_with_format(data, format.into())
            .map_err(|e| format!("undecodable {} ({} bytes): {}", format.mime_type(), data.len(), e))?;
        Ok(Self {
            data,
            format,
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

/// A small valid PNG for tests.
#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let pixels = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 40, 40]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    pixels
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
