use crate::buffer::Sample;

use super::error::DecodeError;
use super::layout;

/// Field access over the first row of a mark sub-channel.
pub struct MarkReader<'a> {
    row: &'a [u32],
}

impl<'a> MarkReader<'a> {
    pub fn new(row: &'a [u32]) -> Result<Self, DecodeError> {
        if row.len() < layout::MARK_MIN_COLUMNS {
            return Err(DecodeError::MarkTooNarrow {
                needed: layout::MARK_MIN_COLUMNS,
                width: row.len(),
            });
        }
        Ok(Self { row })
    }

    /// Session counter; the word is signed on the wire.
    pub fn read_counter(&self) -> i32 {
        self.row[layout::MARK_COUNTER_COLUMN] as i32
    }

    pub fn read_overtrig(&self) -> u8 {
        ((self.flags() >> layout::OVERTRIG_SHIFT) & layout::OVERTRIG_MASK) as u8
    }

    pub fn read_enable(&self) -> bool {
        (self.flags() >> layout::ENABLE_SHIFT) & layout::ENABLE_MASK == 1
    }

    fn flags(&self) -> u32 {
        self.row[layout::MARK_FLAGS_COLUMN]
    }
}

/// Split a packed `[B G R pad]` word into `(blue, green, red)`.
pub fn unpack_rgb(word: u32) -> (u8, u8, u8) {
    let channel = |shift: u32| ((word >> shift) & layout::RGB_CHANNEL_MASK) as u8;
    (
        channel(layout::RGB_BLUE_SHIFT),
        channel(layout::RGB_GREEN_SHIFT),
        channel(layout::RGB_RED_SHIFT),
    )
}

/// Running sum and count of retained samples.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: u64,
}

impl MeanAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every non-sentinel sample.
    pub fn extend<T: Sample>(&mut self, samples: &[T]) {
        for &sample in samples {
            if !sample.is_missing() {
                self.sum += sample.to_f64();
                self.count += 1;
            }
        }
    }

    /// Add every non-zero packed word as three brightness samples.
    pub fn extend_rgb(&mut self, words: &[u32]) {
        for &word in words {
            if word.is_missing() {
                continue;
            }
            let (blue, green, red) = unpack_rgb(word);
            self.sum += f64::from(blue) + f64::from(green) + f64::from(red);
            self.count += layout::RGB_CHANNELS;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the retained samples.
    ///
    /// # Errors
    /// `NoSampleData` when nothing was retained, `NonFiniteMean` when float
    /// input produced NaN or infinity.
    pub fn finish(&self) -> Result<f64, DecodeError> {
        if self.count == 0 {
            return Err(DecodeError::NoSampleData);
        }
        let mean = self.sum / self.count as f64;
        if !mean.is_finite() {
            return Err(DecodeError::NonFiniteMean);
        }
        Ok(mean)
    }
}
