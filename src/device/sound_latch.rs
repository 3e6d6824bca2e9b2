/// Edge-triggered discrete-audio latch.
///
/// The sound effects live on discrete analog circuits wired to output
/// ports 3 and 5. A sample must start only when its control line
/// transitions 0→1: game code holds a bit high for the duration of a
/// sound, and retriggering on every port write would restart the sample
/// each frame. The latch keeps the previously written byte and classifies
/// each write into a mask of newly activated channels. It performs no I/O
/// itself; playing the samples is the backend's business.
///
/// One channel is special: the UFO sound (port 3 bit 0) free-runs on the
/// real board, so it reports active whenever the old *or* new byte has the
/// bit set, not just on the rising edge. Channels with that behavior are
/// selected with [`with_level_bits`](Self::with_level_bits).
pub struct SoundLatch {
    /// Byte from the previous write, the comparison baseline.
    previous: u8,
    /// Channels reported level-OR instead of edge-triggered.
    level_bits: u8,
}

impl SoundLatch {
    /// A latch with every channel edge-triggered.
    pub fn new() -> Self {
        Self::with_level_bits(0)
    }

    /// A latch where the channels in `mask` report `new | old` (level-OR)
    /// instead of `new & !old` (rising edge).
    pub fn with_level_bits(mask: u8) -> Self {
        Self {
            previous: 0,
            level_bits: mask,
        }
    }

    /// Classify a port write into a trigger mask and latch the new byte.
    ///
    /// Bit *i* of the result is set when channel *i* should sound: a 0→1
    /// transition for edge channels, activity on either side of the write
    /// for level channels. The stored byte is replaced unconditionally,
    /// so a held edge-channel bit triggers exactly once.
    pub fn write(&mut self, data: u8) -> u8 {
        let rising = data & !self.previous;
        let level = (data | self.previous) & self.level_bits;
        self.previous = data;
        rising | level
    }

    /// The most recently latched byte.
    pub fn previous(&self) -> u8 {
        self.previous
    }
}

impl Default for SoundLatch {
    fn default() -> Self {
        Self::new()
    }
}
