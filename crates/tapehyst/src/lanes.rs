//! Channel lanes for batched processing.
//!
//! A [`LaneBuffer`] regroups planar channels into groups of `L` channels
//! stored sample-interleaved, so one pass over a group advances `L`
//! independent channels per sample. The last group is padded with silent
//! lanes when the channel count is not a multiple of `L`.
//!
//! ```text
//! planar:  ch0: a0 a1 a2 ..   ch1: b0 b1 b2 ..   ch2: c0 c1 c2 ..
//! lanes:   group0: a0 b0 a1 b1 a2 b2 ..
//!          group1: c0 0  c1 0  c2 0  ..
//! ```

/// Lane width used by the processor.
pub const LANE_WIDTH: usize = 2;

/// Number of channels after padding `num_channels` up to a multiple of `L`.
#[inline]
pub const fn padded_channels<const L: usize>(num_channels: usize) -> usize {
    num_channels.div_ceil(L) * L
}

/// Interleaved channel groups with preallocated storage.
#[derive(Debug, Clone)]
pub struct LaneBuffer<const L: usize = LANE_WIDTH> {
    data: Vec<f64>,
    num_channels: usize,
    num_groups: usize,
    capacity: usize,
    num_samples: usize,
}

impl<const L: usize> LaneBuffer<L> {
    /// Allocate room for `num_channels` channels of up to `max_samples`.
    pub fn new(num_channels: usize, max_samples: usize) -> Self {
        let num_groups = num_channels.div_ceil(L);
        Self {
            data: vec![0.0; num_groups * L * max_samples],
            num_channels,
            num_groups,
            capacity: max_samples,
            num_samples: 0,
        }
    }

    /// Real (unpadded) channel count.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Channel count including padding lanes.
    pub fn padded_channels(&self) -> usize {
        self.num_groups * L
    }

    /// Samples per lane in the current block.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Load the first `num_samples` of each planar channel.
    ///
    /// Channels missing from `channels` and all padding lanes read as zero.
    pub fn interleave<C: AsRef<[f64]>>(&mut self, channels: &[C], num_samples: usize) {
        debug_assert!(num_samples <= self.capacity, "block exceeds lane capacity");
        let num_samples = num_samples.min(self.capacity);
        self.num_samples = num_samples;
        let num_channels = self.num_channels;
        let capacity = self.capacity;

        for group in 0..self.num_groups {
            let start = group * L * capacity;
            let frames = &mut self.data[start..start + L * num_samples];
            for lane in 0..L {
                let ch = group * L + lane;
                let source = channels.get(ch).filter(|_| ch < num_channels).map(|c| c.as_ref());
                match source {
                    Some(src) => {
                        for (frame, &x) in frames.chunks_exact_mut(L).zip(&src[..num_samples]) {
                            frame[lane] = x;
                        }
                    }
                    None => {
                        for frame in frames.chunks_exact_mut(L) {
                            frame[lane] = 0.0;
                        }
                    }
                }
            }
        }
    }

    /// Write the current block back to planar channels. Padding is dropped.
    pub fn deinterleave<C: AsMut<[f64]>>(&self, channels: &mut [C]) {
        let num_samples = self.num_samples;
        for (ch, dest) in channels.iter_mut().enumerate().take(self.num_channels) {
            let (group, lane) = (ch / L, ch % L);
            let start = group * L * self.capacity;
            let frames = &self.data[start..start + L * num_samples];
            for (y, frame) in dest.as_mut()[..num_samples].iter_mut().zip(frames.chunks_exact(L)) {
                *y = frame[lane];
            }
        }
    }

    /// Interleaved frames of one group for the current block.
    #[inline]
    pub fn group_mut(&mut self, group: usize) -> &mut [f64] {
        let start = group * L * self.capacity;
        &mut self.data[start..start + L * self.num_samples]
    }

    /// Interleaved frames of one group for the current block.
    #[inline]
    pub fn group(&self, group: usize) -> &[f64] {
        let start = group * L * self.capacity;
        &self.data[start..start + L * self.num_samples]
    }
}
