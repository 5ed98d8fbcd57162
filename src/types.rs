use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

pub const JPEG_TYPE: &str = "jpg";
pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => JPEG_TYPE,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => JPEG_MIME,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Pixel dimensions recovered from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u16,
    pub height: u16,
    pub format: ImageFormat,
}

impl ImageSize {
    pub fn jpeg(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            format: ImageFormat::Jpeg,
        }
    }

    #[inline]
    pub fn type_tag(&self) -> &'static str {
        self.format.extension()
    }

    #[inline]
    pub fn mime(&self) -> &'static str {
        self.format.mime_type()
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} ({})", self.width, self.height, self.mime())
    }
}

// Flat `{width, height, type, mime}` object.
impl Serialize for ImageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImageSize", 4)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("type", self.type_tag())?;
        state.serialize_field("mime", self.mime())?;
        state.end()
    }
}
