//! Audio buffer abstraction for block processing.
//!
//! [`Buffer`] pairs the host's input channels with its output channels for
//! one processing block. Keeping the dry input separate from the wet output
//! is what lets the bypass crossfade blend the two after the hysteresis
//! chain has written the output.
//!
//! # Real-Time Safety
//!
//! Channel slices live in fixed-size stack arrays. No heap allocations occur
//! during construction or use.
//!
//! # Example
//!
//! ```ignore
//! let mut buffer = Buffer::new(inputs.iter().map(|c| &c[..]), outputs.iter_mut().map(|c| &mut c[..]), 512);
//! processor.process(&mut buffer);
//! ```

use crate::sample::Sample;
use crate::types::MAX_CHANNELS;

// =============================================================================
// Buffer - Main Audio I/O
// =============================================================================

/// Main audio buffer for one processing block.
///
/// `S` is the host sample type, defaulting to `f32`. Use `Buffer<f64>` for
/// 64-bit hosts.
///
/// The `'a` lifetime ties the buffer to the host's audio data; a buffer is
/// only valid within a single `process()` call.
pub struct Buffer<'a, S: Sample = f32> {
    /// Input channel slices (dry audio from host)
    inputs: [Option<&'a [S]>; MAX_CHANNELS],
    /// Output channel slices (wet audio to host)
    outputs: [Option<&'a mut [S]>; MAX_CHANNELS],
    num_input_channels: usize,
    num_output_channels: usize,
    num_samples: usize,
}

impl<'a, S: Sample> Buffer<'a, S> {
    /// Create a new buffer from channel slices.
    ///
    /// Channels beyond [`MAX_CHANNELS`] are silently ignored.
    #[inline]
    pub fn new(
        inputs: impl IntoIterator<Item = &'a [S]>,
        outputs: impl IntoIterator<Item = &'a mut [S]>,
        num_samples: usize,
    ) -> Self {
        let mut input_arr: [Option<&'a [S]>; MAX_CHANNELS] = [None; MAX_CHANNELS];
        let mut num_input_channels = 0;
        for (i, slice) in inputs.into_iter().take(MAX_CHANNELS).enumerate() {
            input_arr[i] = Some(slice);
            num_input_channels = i + 1;
        }

        // Can't use [None; N] for &mut because it's not Copy
        let mut output_arr: [Option<&'a mut [S]>; MAX_CHANNELS] = std::array::from_fn(|_| None);
        let mut num_output_channels = 0;
        for (i, slice) in outputs.into_iter().take(MAX_CHANNELS).enumerate() {
            output_arr[i] = Some(slice);
            num_output_channels = i + 1;
        }

        Self {
            inputs: input_arr,
            outputs: output_arr,
            num_input_channels,
            num_output_channels,
            num_samples,
        }
    }

    /// Number of samples in this processing block.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of input channels.
    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    /// Number of output channels.
    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.num_output_channels
    }

    /// Number of channels present on both sides.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_input_channels.min(self.num_output_channels)
    }

    /// Get an input channel by index.
    ///
    /// Returns an empty slice if the channel doesn't exist.
    #[inline]
    pub fn input(&self, channel: usize) -> &[S] {
        self.inputs
            .get(channel)
            .and_then(|opt| opt.as_ref())
            .map(|ch| &ch[..self.num_samples])
            .unwrap_or(&[])
    }

    /// Get a mutable output channel by index.
    ///
    /// Returns an empty slice if the channel doesn't exist.
    #[inline]
    pub fn output(&mut self, channel: usize) -> &mut [S] {
        let n = self.num_samples;
        match self.outputs.get_mut(channel).and_then(|opt| opt.as_mut()) {
            Some(ch) => &mut ch[..n],
            None => &mut [],
        }
    }

    /// Get one input channel and its matching output channel together.
    #[inline]
    pub fn channel_pair(&mut self, channel: usize) -> (&[S], &mut [S]) {
        let n = self.num_samples;
        let input = self
            .inputs
            .get(channel)
            .and_then(|opt| opt.as_ref())
            .map(|ch| &ch[..n])
            .unwrap_or(&[]);
        let output = match self.outputs.get_mut(channel).and_then(|opt| opt.as_mut()) {
            Some(ch) => &mut ch[..n],
            None => &mut [],
        };
        (input, output)
    }

    /// Iterate over paired (input, output) channels.
    ///
    /// Only yields channels that exist on both sides.
    #[inline]
    pub fn zip_channels(&mut self) -> impl Iterator<Item = (&[S], &mut [S])> + use<'_, 'a, S> {
        let n = self.num_samples;
        let num_pairs = self.num_channels();
        self.inputs[..num_pairs]
            .iter()
            .zip(self.outputs[..num_pairs].iter_mut())
            .filter_map(move |(i_opt, o_opt)| match (i_opt.as_ref(), o_opt.as_mut()) {
                (Some(i), Some(o)) => Some((&i[..n], &mut o[..n])),
                _ => None,
            })
    }

    /// Copy all input channels to output channels.
    ///
    /// Used for the fully bypassed state.
    pub fn copy_to_output(&mut self) {
        for (input, output) in self.zip_channels() {
            output.copy_from_slice(input);
        }
    }
}
