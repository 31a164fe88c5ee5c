/// Pixel layouts the core can hand to the host. Only one is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32-bit pixels, top byte ignored.
    Xrgb8888,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Xrgb8888 => 4,
        }
    }
}

/// Owned XRGB8888 frame, row-major, no padding between rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub const FORMAT: PixelFormat = PixelFormat::Xrgb8888;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.width as usize * Self::FORMAT.bytes_per_pixel()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Writes one pixel; coordinates off the frame are ignored.
    pub fn put(&mut self, x: u32, y: u32, color: u32) {
        if x < self.width && y < self.height {
            let at = y as usize * self.width as usize + x as usize;
            self.pixels[at] = color;
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    pub fn as_ptr(&self) -> *const u32 {
        self.pixels.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_four_bytes_per_pixel() {
        let frame = FrameBuffer::new(1920, 1080);
        assert_eq!(frame.pitch(), 7680);
        assert_eq!(frame.pixels().len(), 1920 * 1080);
    }

    #[test]
    fn put_ignores_off_frame_coordinates() {
        let mut frame = FrameBuffer::new(4, 3);
        frame.put(3, 2, 0x00ff_ffff);
        frame.put(4, 0, 0x00ff_0000);
        frame.put(0, 3, 0x00ff_0000);

        assert_eq!(frame.get(3, 2), Some(0x00ff_ffff));
        assert_eq!(frame.get(4, 0), None);
        assert_eq!(frame.pixels().iter().filter(|p| **p != 0).count(), 1);

        frame.clear();
        assert!(frame.pixels().iter().all(|p| *p == 0));
    }
}
