//! Sense HAT 8x8 LED matrix output.
//!
//! The HAT exposes its LEDs as a 16bpp RGB565 framebuffer (`/dev/fbN`
//! whose name is `RPi-Sense FB`). A frame is 128 bytes, row-major,
//! little-endian.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::telemetry::scroll::{Pixel, ScrollBuffer};

pub const HAT_SIZE: usize = 8;
const FB_NAME: &str = "RPi-Sense FB";

/// Pack a pixel into RGB565
pub fn rgb565(p: Pixel) -> u16 {
    ((p.r as u16 >> 3) << 11) | ((p.g as u16 >> 2) << 5) | (p.b as u16 >> 3)
}

/// Find the LED matrix framebuffer by its sysfs name
pub fn find_device() -> Result<PathBuf> {
    find_device_in(Path::new("/sys/class/graphics"))
}

fn find_device_in(sysfs: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(sysfs).with_context(|| format!("listing {}", sysfs.display()))?;
    let mut candidates: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("fb"))
        .collect();
    candidates.sort();

    for fb in candidates {
        let name = fs::read_to_string(sysfs.join(&fb).join("name")).unwrap_or_default();
        if name.trim() == FB_NAME {
            return Ok(PathBuf::from("/dev").join(fb));
        }
    }
    bail!("no '{FB_NAME}' framebuffer found; is the Sense HAT attached?")
}

/// Writes a scroll buffer to the LED framebuffer
pub struct SenseHat<W> {
    out: W,
}

impl SenseHat<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Seek> SenseHat<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Draw the newest 8x8 corner of `buf`.
    ///
    /// Buffer column x lands on display row x, so on the HAT time flows
    /// from the top row downwards and the bars grow sideways.
    pub fn draw(&mut self, buf: &ScrollBuffer) -> Result<()> {
        let mut frame = [0u8; HAT_SIZE * HAT_SIZE * 2];
        for x in 0..HAT_SIZE {
            for y in 0..HAT_SIZE {
                let pixel = buf.get(x, y).unwrap_or_default();
                let offset = (x * HAT_SIZE + y) * 2;
                frame[offset..offset + 2].copy_from_slice(&rgb565(pixel).to_le_bytes());
            }
        }
        self.out.seek(SeekFrom::Start(0))?;
        self.out.write_all(&frame)?;
        self.out.flush()?;
        Ok(())
    }

    /// Turn every LED off
    pub fn clear(&mut self) -> Result<()> {
        self.draw(&ScrollBuffer::new(0, 0))
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn word(frame: &[u8], row: usize, col: usize) -> u16 {
        let offset = (row * HAT_SIZE + col) * 2;
        u16::from_le_bytes([frame[offset], frame[offset + 1]])
    }

    #[test]
    fn rgb565_packing() {
        assert_eq!(rgb565(Pixel::new(255, 255, 255)), 0xFFFF);
        assert_eq!(rgb565(Pixel::new(255, 0, 0)), 0xF800);
        assert_eq!(rgb565(Pixel::new(0, 255, 0)), 0x07E0);
        assert_eq!(rgb565(Pixel::new(0, 0, 255)), 0x001F);
        assert_eq!(rgb565(Pixel::new(32, 0, 0)), 4 << 11);
    }

    #[test]
    fn newest_column_becomes_top_row() {
        let mut buf = ScrollBuffer::new(HAT_SIZE, HAT_SIZE);
        buf.advance(0.25, 0.0);

        let mut hat = SenseHat::new(Cursor::new(Vec::new()));
        hat.draw(&buf).unwrap();
        let frame = hat.into_inner().into_inner();

        assert_eq!(frame.len(), 128);
        assert_eq!(word(&frame, 0, 0), rgb565(Pixel::new(32, 0, 0)));
        assert_eq!(word(&frame, 0, 1), rgb565(Pixel::new(56, 0, 0)));
        assert_eq!(word(&frame, 0, 2), 0);
        assert_eq!(word(&frame, 1, 0), 0);
    }

    #[test]
    fn redraw_overwrites_in_place() {
        let mut buf = ScrollBuffer::new(HAT_SIZE, HAT_SIZE);
        let mut hat = SenseHat::new(Cursor::new(Vec::new()));
        buf.advance(1.0, 1.0);
        hat.draw(&buf).unwrap();
        hat.clear().unwrap();
        let frame = hat.into_inner().into_inner();
        assert_eq!(frame, vec![0u8; 128]);
    }

    #[test]
    fn device_found_by_name() {
        let dir = std::env::temp_dir().join(format!("wanmatrix-fb-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("fb0")).unwrap();
        fs::create_dir_all(dir.join("fb1")).unwrap();
        fs::write(dir.join("fb0").join("name"), "simple\n").unwrap();
        fs::write(dir.join("fb1").join("name"), "RPi-Sense FB\n").unwrap();

        assert_eq!(find_device_in(&dir).unwrap(), PathBuf::from("/dev/fb1"));

        fs::write(dir.join("fb1").join("name"), "other\n").unwrap();
        assert!(find_device_in(&dir).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
