use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::debug;

use super::framebuffer::{Framebuffer, BYTES_PER_PIXEL};

pub const FILE_HEADER_SIZE: u32 = 14;
pub const INFO_HEADER_SIZE: u32 = 40;
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
const BITS_PER_PIXEL: u16 = 24;

/// Bytes per stored row, padded to a multiple of four.
pub fn row_stride(width: u32) -> usize {
    (BYTES_PER_PIXEL * width as usize + 3) / 4 * 4
}

/// Writes `framebuffer` as an uncompressed 24-bit BMP: file header, info
/// header, then rows bottom-up in blue-green-red order.
pub fn encode_bitmap<W: Write>(writer: &mut W, framebuffer: &Framebuffer) -> io::Result<()> {
    let width = framebuffer.width();
    let height = framebuffer.height();
    let stride = row_stride(width);
    let image_size = u32::try_from(stride * height as usize)
        .ok()
        .filter(|size| size.checked_add(PIXEL_DATA_OFFSET).is_some())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "image too large for BMP"))?;

    // BITMAPFILEHEADER
    writer.write_all(b"BM")?;
    writer.write_all(&(PIXEL_DATA_OFFSET + image_size).to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&PIXEL_DATA_OFFSET.to_le_bytes())?;

    // BITMAPINFOHEADER
    writer.write_all(&INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(width as i32).to_le_bytes())?;
    writer.write_all(&(height as i32).to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?;
    writer.write_all(&BITS_PER_PIXEL.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&image_size.to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;

    let mut line = vec![0u8; stride];
    for row in (0..height).rev() {
        for (col, target) in (0..width).zip(line.chunks_exact_mut(BYTES_PER_PIXEL)) {
            target.copy_from_slice(&framebuffer.pixel(col, row).to_bgr());
        }
        writer.write_all(&line)?;
    }
    Ok(())
}

pub fn write_bitmap(path: &Path, framebuffer: &Framebuffer) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode_bitmap(&mut writer, framebuffer)?;
    writer.flush()?;
    debug!(
        "Wrote {}x{} bitmap to {}",
        framebuffer.width(),
        framebuffer.height(),
        path.display()
    );
    Ok(())
}
