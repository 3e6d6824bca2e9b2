use std::sync::{Arc, Mutex};

use crate::memory::VideoMemory;

/// The most recent full copy of the 1bpp frame, shared between the
/// CPU/timing context and the render context.
///
/// Cloning the handle is cheap and shares the underlying buffer, so a
/// renderer on another thread can hold its own copy. Exactly one writer
/// path exists (the vertical-blank refresh inside
/// [`IoController::service_interrupts`](crate::core::IoController::service_interrupts))
/// and one reader, [`blit`](FrameBuffer::blit). Both take the same
/// mutex; the buffer is allocated once and refreshed in place, never
/// reallocated.
#[derive(Clone)]
pub struct FrameBuffer {
    vram: Arc<Mutex<Vec<u8>>>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub(crate) fn new(vram_len: usize, width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        debug_assert!(width > 0 && height > 0);
        debug_assert_eq!(
            vram_len * 8,
            width * height,
            "vram of {vram_len} bytes does not pack a {width}x{height} frame",
        );
        Self {
            vram: Arc::new(Mutex::new(vec![0u8; vram_len])),
            width,
            height,
        }
    }

    /// Displayed frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Displayed frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Overwrite the snapshot with the provider's current video RAM.
    ///
    /// The single writer path; holds the lock for the span of the copy.
    pub(crate) fn refresh_from(&self, memory: &impl VideoMemory) {
        let mut vram = self.vram.lock().expect("frame buffer lock poisoned");
        memory.copy_vram(&mut vram);
    }

    /// Decompress the snapshot into `texture` at one byte per pixel,
    /// correcting the frame's rotation. See [`unpack_rotated`] for the
    /// transform; the lock is held for the whole pass, which is safe
    /// because decompression only reads.
    ///
    /// `texture` is caller-owned and must hold `width × height` pixel
    /// bytes at a scanline stride of `row_bytes`.
    pub fn blit(&self, texture: &mut [u8], row_bytes: usize) {
        let vram = self.vram.lock().expect("frame buffer lock poisoned");
        unpack_rotated(&vram, texture, row_bytes, self.width, self.height);
    }
}

/// Decompress a packed 1bpp frame into an 8bpp texture, rotating it
/// upright.
///
/// The frame buffer stores the image rotated 90°: each source byte holds
/// 8 vertically adjacent display pixels, bottom-up, least significant bit
/// first, and each 1bpp source row is one display column, left to right.
/// Rather than computing coordinates per pixel, a write cursor starts at
/// the bottom of display column 0 and steps one scanline stride backward
/// per bit; when the top of the texture is passed the column is exhausted
/// and the cursor reseeds one byte further along the bottom row, at the
/// foot of the next column.
///
/// Reads exactly `vram.len()` bytes, writes exactly `width * height`
/// bytes, each `0x00` or `0xFF`. Stride padding beyond `width` is left
/// untouched. A `texture` or `row_bytes` too small for the frame is a
/// caller contract violation and panics.
fn unpack_rotated(vram: &[u8], texture: &mut [u8], row_bytes: usize, width: usize, height: usize) {
    assert!(
        row_bytes >= width,
        "row stride {row_bytes} narrower than frame width {width}",
    );
    assert!(
        texture.len() >= row_bytes * (height - 1) + width,
        "texture of {} bytes cannot hold a {width}x{height} frame at stride {row_bytes}",
        texture.len(),
    );

    // Bottom-left corner of the output; the first source bit lands here.
    let mut row_start = row_bytes * (height - 1);
    let mut cursor = row_start;
    for &byte in vram {
        for bit in 0..8 {
            texture[cursor] = ((byte >> bit) & 0x01) * 0xFF;
            if cursor >= row_bytes {
                // Up one scanline, same column.
                cursor -= row_bytes;
            } else {
                // Top of the column reached: restart at the bottom of
                // the next column.
                row_start += 1;
                cursor = row_start;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 2x8 frame packs into two source bytes: byte 0 is display column
    // 0 bottom-to-top, byte 1 is column 1.

    #[test]
    fn first_bit_lands_bottom_left() {
        let mut texture = [0u8; 16];
        unpack_rotated(&[0x01, 0x00], &mut texture, 2, 2, 8);
        assert_eq!(texture[14], 0xFF); // (0, 7)
        assert_eq!(texture.iter().filter(|&&p| p == 0xFF).count(), 1);
    }

    #[test]
    fn high_bit_lands_top_of_column() {
        let mut texture = [0u8; 16];
        unpack_rotated(&[0x80, 0x00], &mut texture, 2, 2, 8);
        assert_eq!(texture[0], 0xFF); // (0, 0)
        assert_eq!(texture.iter().filter(|&&p| p == 0xFF).count(), 1);
    }

    #[test]
    fn second_byte_fills_second_column() {
        let mut texture = [0u8; 16];
        unpack_rotated(&[0x00, 0x01], &mut texture, 2, 2, 8);
        assert_eq!(texture[15], 0xFF); // (1, 7)
        assert_eq!(texture.iter().filter(|&&p| p == 0xFF).count(), 1);
    }

    #[test]
    fn stride_padding_is_untouched() {
        // Stride 5 on a 2-wide frame: three padding bytes per scanline.
        let mut texture = [0xAAu8; 5 * 7 + 2];
        unpack_rotated(&[0xFF, 0xFF], &mut texture, 5, 2, 8);
        for row in 0..8 {
            assert_eq!(&texture[row * 5..row * 5 + 2], &[0xFF, 0xFF]);
        }
        for (i, &p) in texture.iter().enumerate() {
            if i % 5 >= 2 {
                assert_eq!(p, 0xAA, "padding byte {i} overwritten");
            }
        }
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn undersized_texture_is_fatal() {
        let mut texture = [0u8; 15];
        unpack_rotated(&[0x00, 0x00], &mut texture, 2, 2, 8);
    }

    #[test]
    #[should_panic(expected = "narrower than frame width")]
    fn undersized_stride_is_fatal() {
        let mut texture = [0u8; 16];
        unpack_rotated(&[0x00, 0x00], &mut texture, 1, 2, 8);
    }
}
