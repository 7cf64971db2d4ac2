//! Inclusive bit-range access inside 32-bit words.
//!
//! Bit 0 is the least significant bit. A range `[begin, end]` includes both
//! ends, so `[0, 31]` is the whole word.

/// Number of data words holding the 64 channels of one block.
pub const CHANNEL_WORDS: usize = 24;

/// Width in bits of one channel reading.
pub const CHANNEL_BITS: u32 = 12;

const fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Extract bits `[begin, end]` of `word`, shifted down to bit 0.
pub const fn get_bits(word: u32, begin: u32, end: u32) -> u32 {
    debug_assert!(begin <= end && end < 32);
    if begin == 0 && end == 31 {
        return word;
    }
    (word >> begin) & mask(end - begin + 1)
}

/// Overwrite bits `[begin, end]` of `word` with the low bits of `value`.
///
/// Bits of `value` above the range width are discarded.
pub fn set_bits(word: &mut u32, value: u32, begin: u32, end: u32) {
    debug_assert!(begin <= end && end < 32);
    if begin == 0 && end == 31 {
        *word = value;
        return;
    }
    let m = mask(end - begin + 1);
    *word = (*word & !(m << begin)) | ((value & m) << begin);
}

/// Location of one 12-bit channel inside a block's 24 channel words.
///
/// Every channel is split in two parts. The low `split` bits live at
/// `first_offset` in `first_word`, the remaining `12 - split` bits at
/// `second_offset` in `second_word` (which may be the same word).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSlot {
    pub first_word: usize,
    pub first_offset: u32,
    pub second_word: usize,
    pub second_offset: u32,
    pub split: u32,
}

impl ChannelSlot {
    /// Compute the slot of channel `ch` of stream (ADC) `adc`.
    ///
    /// Two streams share each group of 6 words, interleaved byte-wise: the
    /// even stream owns bits [0,7] and [16,23], the odd stream bits [8,15]
    /// and [24,31]. Seen from one stream every word therefore holds 16 bits.
    pub const fn locate(adc: usize, ch: usize) -> Self {
        debug_assert!(adc < 8 && ch < 8);
        let first_word = (adc / 2) * 6 + (12 * ch) / 16;
        let mut first_offset = ((12 * ch) % 16) as u32;

        // Even channels split 8/4, odd ones 4/8.
        let split = 4 * (2 - (ch % 2) as u32);

        let second_word = first_word + ((first_offset + split) / 16) as usize;
        let mut second_offset = (first_offset + split) % 16;

        // Stream-relative bits 8-15 sit at word bits 16-23.
        first_offset += (first_offset / 8) * 8;
        second_offset += (second_offset / 8) * 8;

        // Odd streams sit one byte higher.
        let odd = (adc % 2) as u32 * 8;
        Self {
            first_word,
            first_offset: first_offset + odd,
            second_word,
            second_offset: second_offset + odd,
            split,
        }
    }
}

/// Read channel `ch` of stream `adc` from a block's channel words.
pub fn get_channel(words: &[u32], adc: usize, ch: usize) -> u16 {
    let slot = ChannelSlot::locate(adc, ch);
    let low = get_bits(
        words[slot.first_word],
        slot.first_offset,
        slot.first_offset + slot.split - 1,
    );
    let high = get_bits(
        words[slot.second_word],
        slot.second_offset,
        slot.second_offset + CHANNEL_BITS - slot.split - 1,
    );
    (low | (high << slot.split)) as u16
}

/// Write channel `ch` of stream `adc` into a block's channel words.
///
/// Only the low 12 bits of `value` are stored.
pub fn set_channel(words: &mut [u32], adc: usize, ch: usize, value: u16) {
    let slot = ChannelSlot::locate(adc, ch);
    let value = u32::from(value);
    set_bits(
        &mut words[slot.first_word],
        value,
        slot.first_offset,
        slot.first_offset + slot.split - 1,
    );
    set_bits(
        &mut words[slot.second_word],
        value >> slot.split,
        slot.second_offset,
        slot.second_offset + CHANNEL_BITS - slot.split - 1,
    );
}
