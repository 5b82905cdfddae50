use crate::utils::error::{JpegError, JpegResult};

/// Planar RGB image buffer.
///
/// The three planes are always allocated together and hold exactly
/// `ncol * nrow` bytes each; there is no partially allocated state. The
/// buffer is exclusively owned by whoever holds the value, and dropping
/// it releases every plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    ncol: u32,
    nrow: u32,
    r: Vec<u8>,
    g: Vec<u8>,
    b: Vec<u8>,
}

impl RgbImage {
    /// Allocates a zeroed image of `ncol` x `nrow` pixels.
    ///
    /// Allocation is all-or-nothing: if any plane cannot be reserved the
    /// planes already built are dropped and `AllocationFailure` is
    /// returned.
    pub fn new(ncol: u32, nrow: u32) -> JpegResult<RgbImage> {
        let npix = (ncol as usize)
            .checked_mul(nrow as usize)
            .ok_or(JpegError::AllocationFailure(usize::MAX))?;

        let r = Self::alloc_plane(npix)?;
        let g = Self::alloc_plane(npix)?;
        let b = Self::alloc_plane(npix)?;

        Ok(RgbImage { ncol, nrow, r, g, b })
    }

    fn alloc_plane(npix: usize) -> JpegResult<Vec<u8>> {
        let mut plane = Vec::new();
        plane
            .try_reserve_exact(npix)
            .map_err(|_| JpegError::AllocationFailure(npix))?;
        plane.resize(npix, 0);
        Ok(plane)
    }

    pub fn ncol(&self) -> u32 {
        self.ncol
    }

    pub fn nrow(&self) -> u32 {
        self.nrow
    }

    pub fn npix(&self) -> usize {
        self.r.len()
    }

    fn index(&self, x: u32, y: u32) -> JpegResult<usize> {
        if x >= self.ncol || y >= self.nrow {
            return Err(JpegError::OutOfBounds {
                x,
                y,
                width: self.ncol,
                height: self.nrow,
            });
        }
        Ok(y as usize * self.ncol as usize + x as usize)
    }

    /// Returns the pixel at `(x, y)`, failing with `OutOfBounds` outside
    /// the image.
    pub fn read_rgb(&self, x: u32, y: u32) -> JpegResult<(u8, u8, u8)> {
        let i = self.index(x, y)?;
        Ok((self.r[i], self.g[i], self.b[i]))
    }

    /// Sets the pixel at `(x, y)`, failing with `OutOfBounds` outside the
    /// image. On failure no plane is touched.
    pub fn write_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> JpegResult<()> {
        let i = self.index(x, y)?;
        self.r[i] = r;
        self.g[i] = g;
        self.b[i] = b;
        Ok(())
    }

    pub fn planes(&self) -> (&[u8], &[u8], &[u8]) {
        (&self.r, &self.g, &self.b)
    }

    /// Packs the planes into interleaved `R G B` triples, row-major.
    pub fn to_interleaved(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.npix() * 3);
        for i in 0..self.npix() {
            pixels.push(self.r[i]);
            pixels.push(self.g[i]);
            pixels.push(self.b[i]);
        }
        pixels
    }

    /// Builds an image from interleaved `R G B` triples. The slice length
    /// must be exactly `ncol * nrow * 3`; on a mismatch the error names
    /// the first pixel the slice fails to provide (or the first pixel
    /// past the image when the slice is too long).
    pub fn from_interleaved(ncol: u32, nrow: u32, pixels: &[u8]) -> JpegResult<RgbImage> {
        let mut image = RgbImage::new(ncol, nrow)?;
        if pixels.len() != image.npix() * 3 {
            let i = (pixels.len() / 3).min(image.npix());
            let (x, y) = if ncol == 0 {
                (0, 0)
            } else {
                ((i % ncol as usize) as u32, (i / ncol as usize) as u32)
            };
            return Err(JpegError::OutOfBounds {
                x,
                y,
                width: ncol,
                height: nrow,
            });
        }
        for (i, rgb) in pixels.chunks_exact(3).enumerate() {
            image.r[i] = rgb[0];
            image.g[i] = rgb[1];
            image.b[i] = rgb[2];
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_lengths_match() {
        let image = RgbImage::new(5, 3).unwrap();
        assert_eq!(image.npix(), 15);
        let (r, g, b) = image.planes();
        assert_eq!(r.len(), 15);
        assert_eq!(g.len(), 15);
        assert_eq!(b.len(), 15);
    }

    #[test]
    fn interleave_round_trip() {
        let mut image = RgbImage::new(2, 2).unwrap();
        image.write_rgb(0, 0, 1, 2, 3).unwrap();
        image.write_rgb(1, 1, 7, 8, 9).unwrap();

        let packed = image.to_interleaved();
        assert_eq!(packed.len(), 12);
        assert_eq!(&packed[0..3], &[1, 2, 3]);

        let rebuilt = RgbImage::from_interleaved(2, 2, &packed).unwrap();
        assert_eq!(rebuilt, image);
    }

    #[test]
    fn interleaved_length_mismatch_names_the_missing_pixel() {
        // three pixels for a 2x2 image: pixel (1, 1) is the first missing
        let short = [0u8; 9];
        let result = RgbImage::from_interleaved(2, 2, &short);
        assert!(matches!(
            result,
            Err(JpegError::OutOfBounds { x: 1, y: 1, width: 2, height: 2 })
        ));

        // five pixels for the same image: the first excess lands at (0, 2)
        let long = [0u8; 15];
        let result = RgbImage::from_interleaved(2, 2, &long);
        assert!(matches!(
            result,
            Err(JpegError::OutOfBounds { x: 0, y: 2, .. })
        ));
    }
}
