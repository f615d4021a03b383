//! The audio-thread rendering seam.

/// Something that adds audio into an interleaved output buffer.
///
/// Implementations are called from the audio callback: they must not block,
/// lock, or allocate. Output is **added** to whatever is already in the
/// buffer so several renderables can share one buffer.
pub trait AudioRenderable {
    /// Add `output.len() / channels` frames of audio into `output`.
    fn render(&mut self, output: &mut [f32], channels: usize);

    /// Update the output sample rate.
    fn set_sample_rate(&mut self, sample_rate: f32);
}

/// Number of whole frames in an interleaved buffer.
///
/// A zero channel count is treated as mono.
#[inline]
pub fn frame_count(len: usize, channels: usize) -> usize {
    len / channels.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dc(f32);

    impl AudioRenderable for Dc {
        fn render(&mut self, output: &mut [f32], _channels: usize) {
            for s in output.iter_mut() {
                *s += self.0;
            }
        }

        fn set_sample_rate(&mut self, _sample_rate: f32) {}
    }

    #[test]
    fn renderables_accumulate() {
        let mut buf = [0.0f32; 8];
        Dc(0.25).render(&mut buf, 2);
        Dc(0.5).render(&mut buf, 2);
        assert!(buf.iter().all(|&s| (s - 0.75).abs() < 1e-6));
    }

    #[test]
    fn frame_count_handles_zero_channels() {
        assert_eq!(frame_count(8, 2), 4);
        assert_eq!(frame_count(8, 0), 8);
    }
}
