use std::f32::consts::PI;

/// Separable floating-point 8x8 DCT pair.
///
/// One precomputed cosine basis drives both directions, so the encoder's
/// forward transform and the decoder's inverse are exact mirrors. The
/// orthonormal 1-D transform is applied to rows then columns, which gives
/// the T.81 `1/4 C(u) C(v)` scaling overall. Output of `inverse` agrees
/// with a reference decoder to within ±1 per sample; that tolerance is
/// asserted by tests, not assumed.
#[derive(Debug, Clone)]
pub struct Dct {
    // cos[n][u] = cos((2n + 1) u pi / 16)
    cos: [[f32; 8]; 8],
    // c[0] = 1/sqrt(2), else 1
    c: [f32; 8],
}

impl Dct {
    pub fn new() -> Self {
        let mut cos = [[0.0f32; 8]; 8];
        for n in 0..8 {
            for u in 0..8 {
                cos[n][u] = ((2.0 * n as f32 + 1.0) * u as f32 * PI / 16.0).cos();
            }
        }

        let mut c = [1.0f32; 8];
        c[0] = 1.0 / 2.0f32.sqrt();

        Dct { cos, c }
    }

    fn forward_1d(&self, input: &[f32; 8]) -> [f32; 8] {
        let mut output = [0.0f32; 8];
        for u in 0..8 {
            let mut sum = 0.0;
            for n in 0..8 {
                sum += input[n] * self.cos[n][u];
            }
            output[u] = 0.5 * self.c[u] * sum;
        }
        output
    }

    fn inverse_1d(&self, input: &[f32; 8]) -> [f32; 8] {
        let mut output = [0.0f32; 8];
        for n in 0..8 {
            let mut sum = 0.0;
            for u in 0..8 {
                sum += self.c[u] * input[u] * self.cos[n][u];
            }
            output[n] = 0.5 * sum;
        }
        output
    }

    /// Forward 2-D DCT of 64 level-shifted samples in natural order.
    pub fn forward(&self, block: &[f32]) -> [f32; 64] {
        debug_assert_eq!(block.len(), 64);
        let mut tmp = [0.0f32; 64];
        for row in 0..8 {
            let mut line = [0.0f32; 8];
            line.copy_from_slice(&block[row * 8..row * 8 + 8]);
            tmp[row * 8..row * 8 + 8].copy_from_slice(&self.forward_1d(&line));
        }

        let mut out = [0.0f32; 64];
        for col in 0..8 {
            let mut line = [0.0f32; 8];
            for row in 0..8 {
                line[row] = tmp[row * 8 + col];
            }
            let transformed = self.forward_1d(&line);
            for row in 0..8 {
                out[row * 8 + col] = transformed[row];
            }
        }
        out
    }

    /// Inverse 2-D DCT of 64 dequantized coefficients in natural order.
    /// The result is level-shifted by +128 and clamped to [0, 255].
    pub fn inverse(&self, block: &mut [i32]) {
        debug_assert_eq!(block.len(), 64);
        let mut tmp = [0.0f32; 64];
        for col in 0..8 {
            let mut line = [0.0f32; 8];
            for row in 0..8 {
                line[row] = block[row * 8 + col] as f32;
            }
            let transformed = self.inverse_1d(&line);
            for row in 0..8 {
                tmp[row * 8 + col] = transformed[row];
            }
        }

        for row in 0..8 {
            let mut line = [0.0f32; 8];
            line.copy_from_slice(&tmp[row * 8..row * 8 + 8]);
            let transformed = self.inverse_1d(&line);
            for (col, value) in transformed.iter().enumerate() {
                block[row * 8 + col] = (value + 128.0).round().clamp(0.0, 255.0) as i32;
            }
        }
    }
}
