//! Pixel sinks that receive the rendered image in scanline order.

use crate::renderer::{RenderError, MAX_CHANNEL_VALUE};
use std::io::{self, Write};
use std::path::Path;

/// Destination for quantized pixels.
///
/// `begin` is called once with the image size, then `write_pixel` once per
/// pixel (top row first, left to right), then `finish`.
pub trait PixelSink {
    fn begin(&mut self, width: u32, height: u32) -> io::Result<()>;

    fn write_pixel(&mut self, rgb: [u8; 3]) -> io::Result<()>;

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streams a plain-text (P3) PPM image.
pub struct PpmWriter<W: Write> {
    writer: W,
}

impl<W: Write> PpmWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PixelSink for PpmWriter<W> {
    fn begin(&mut self, width: u32, height: u32) -> io::Result<()> {
        writeln!(self.writer, "P3")?;
        writeln!(self.writer, "{} {}", width, height)?;
        writeln!(self.writer, "{}", MAX_CHANNEL_VALUE)
    }

    fn write_pixel(&mut self, rgb: [u8; 3]) -> io::Result<()> {
        writeln!(self.writer, "{} {} {}", rgb[0], rgb[1], rgb[2])
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// In-memory RGB8 image, filled row by row.
#[derive(Debug, Clone, Default)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y), or `None` outside the written image.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        match self.pixels.get(offset..offset + 3)? {
            &[r, g, b] => Some([r, g, b]),
            _ => None,
        }
    }

    /// Interleaved RGB bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode the buffer as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        image::save_buffer_with_format(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl PixelSink for ImageBuffer {
    fn begin(&mut self, width: u32, height: u32) -> io::Result<()> {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.reserve(self.expected_len());
        Ok(())
    }

    fn write_pixel(&mut self, rgb: [u8; 3]) -> io::Result<()> {
        if self.pixels.len() >= self.expected_len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "more pixels written than the image holds",
            ));
        }
        self.pixels.extend_from_slice(&rgb);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.pixels.len() != self.expected_len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "image incomplete: {} of {} bytes written",
                    self.pixels.len(),
                    self.expected_len()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_layout() {
        let mut ppm = PpmWriter::new(Vec::new());
        ppm.begin(2, 1).unwrap();
        ppm.write_pixel([255, 0, 10]).unwrap();
        ppm.write_pixel([1, 2, 3]).unwrap();
        ppm.finish().unwrap();

        let text = String::from_utf8(ppm.into_inner()).unwrap();
        assert_eq!(text, "P3\n2 1\n255\n255 0 10\n1 2 3\n");
    }

    #[test]
    fn test_image_buffer_row_major() {
        let mut image = ImageBuffer::default();
        image.begin(2, 2).unwrap();
        for value in 0..4u8 {
            image.write_pixel([value, value, value]).unwrap();
        }
        image.finish().unwrap();

        assert_eq!(image.get(0, 0), Some([0, 0, 0]));
        assert_eq!(image.get(1, 0), Some([1, 1, 1]));
        assert_eq!(image.get(0, 1), Some([2, 2, 2]));
        assert_eq!(image.get(1, 1), Some([3, 3, 3]));
    }

    #[test]
    fn test_image_buffer_get_out_of_range() {
        let mut image = ImageBuffer::default();
        assert_eq!(image.get(0, 0), None);

        image.begin(2, 1).unwrap();
        image.write_pixel([9, 9, 9]).unwrap();

        assert_eq!(image.get(0, 0), Some([9, 9, 9]));
        // Inside the frame but not written yet
        assert_eq!(image.get(1, 0), None);
        assert_eq!(image.get(2, 0), None);
        assert_eq!(image.get(0, 1), None);
        assert_eq!(image.get(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_image_buffer_rejects_wrong_pixel_count() {
        let mut short = ImageBuffer::default();
        short.begin(2, 1).unwrap();
        short.write_pixel([0, 0, 0]).unwrap();
        assert_eq!(
            short.finish().unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );

        let mut long = ImageBuffer::default();
        long.begin(1, 1).unwrap();
        long.write_pixel([0, 0, 0]).unwrap();
        assert!(long.write_pixel([0, 0, 0]).is_err());
    }

    #[test]
    fn test_save_png_round_trip() {
        let mut image = ImageBuffer::default();
        image.begin(3, 2).unwrap();
        for i in 0..6u8 {
            image.write_pixel([i * 40, 255 - i, 7]).unwrap();
        }
        image.finish().unwrap();

        let path = std::env::temp_dir().join(format!("glint_png_{}.png", std::process::id()));
        image.save_png(&path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.as_raw().as_slice(), image.as_bytes());
    }
}
