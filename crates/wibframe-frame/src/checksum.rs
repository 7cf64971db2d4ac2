//! Integrity checks over a frame.
//!
//! - checksum A: 16-bit XOR (LRC) over the even 3-word groups of a block
//! - checksum B: 16-bit negated modular sum over the odd 3-word groups
//! - CRC-32, either bit-serial (matching the WIB hardware register) or the
//!   standard zlib form (via `crc32fast`), over every word but the trailer
//!
//! Each check takes an `init`/`padding` argument. Feeding the stored value
//! back in yields 0 when the frame is intact.

use crc32fast::Hasher;

use crate::layout::{Frame, ADC_WORDS_PER_BLOCK, CRC_WORD, NUM_BLOCKS};

/// Reflected CRC-32 polynomial (0x04C11DB7 bit-reversed).
pub const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

/// Channel words per checksum group.
const GROUP_WORDS: usize = 3;

/// Which block checksum a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    A,
    B,
}

/// Which CRC flavour protects the trailer word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrcKind {
    /// CRC-32 as computed by zlib.
    #[default]
    Standard,
    /// Bit-serial LFSR matching the WIB firmware register.
    BitSerial,
    /// Standard CRC-32 ending one word before the trailer (words
    /// `0..CRC_WORD - 1`), as stamped by older generator builds.
    StandardLegacy,
}

impl Frame {
    /// Words of the even (A) or odd (B) 3-word groups of `block`.
    fn checksum_groups(&self, block: usize, odd: bool) -> impl Iterator<Item = u32> + '_ {
        let words = self.adc_words(block);
        let skip = if odd { GROUP_WORDS } else { 0 };
        (0..ADC_WORDS_PER_BLOCK / (2 * GROUP_WORDS)).flat_map(move |group| {
            let start = group * 2 * GROUP_WORDS + skip;
            words[start..start + GROUP_WORDS].iter().copied()
        })
    }

    /// Checksum A of `block`: XOR of the 16-bit halves of the even groups,
    /// seeded with `init`.
    pub fn calculate_checksum_a(&self, block: usize, init: u16) -> u16 {
        self.checksum_groups(block, false)
            .fold(init, |acc, word| acc ^ word as u16 ^ (word >> 16) as u16)
    }

    /// Checksum B of `block`: negated wrapping sum of the 16-bit halves of
    /// the odd groups, seeded with `init`.
    pub fn calculate_checksum_b(&self, block: usize, init: u16) -> u16 {
        let sum = self.checksum_groups(block, true).fold(init, |acc, word| {
            acc.wrapping_add(word as u16).wrapping_add((word >> 16) as u16)
        });
        sum.wrapping_neg()
    }

    /// Bit-serial CRC-32 over words `0..CRC_WORD`, XORed with `padding`.
    ///
    /// The register is loaded with word 0, then every following bit (LSB
    /// first within a word) enters at bit 31 while the register shifts
    /// right. The polynomial is applied whenever a set bit leaves at bit 0.
    pub fn crc32_bitserial(&self, padding: u32, polynomial: u32) -> u32 {
        let words = self.as_words();
        let mut reg = words[0];
        if reg & 1 == 1 {
            reg ^= polynomial;
        }
        for i in 0..(CRC_WORD - 1) * 32 {
            let input = (words[i / 32 + 1] >> (i % 32)) & 1;
            let out = reg & 1;
            reg = (reg >> 1) | (input << 31);
            if out == 1 {
                reg ^= polynomial;
            }
        }
        reg ^ padding
    }

    /// Standard CRC-32 over the little-endian bytes of words `0..CRC_WORD`,
    /// XORed with `padding`.
    pub fn crc32_standard(&self, padding: u32) -> u32 {
        self.standard_crc_over(CRC_WORD) ^ padding
    }

    /// Standard CRC-32 over words `0..CRC_WORD - 1`, XORed with `padding`.
    pub fn crc32_standard_legacy(&self, padding: u32) -> u32 {
        self.standard_crc_over(CRC_WORD - 1) ^ padding
    }

    fn standard_crc_over(&self, words: usize) -> u32 {
        let mut hasher = Hasher::new();
        for word in &self.as_words()[..words] {
            hasher.update(&word.to_le_bytes());
        }
        hasher.finalize()
    }

    /// Frame CRC of the given flavour.
    pub fn crc(&self, kind: CrcKind, padding: u32) -> u32 {
        match kind {
            CrcKind::Standard => self.crc32_standard(padding),
            CrcKind::BitSerial => self.crc32_bitserial(padding, CRC32_POLYNOMIAL),
            CrcKind::StandardLegacy => self.crc32_standard_legacy(padding),
        }
    }

    /// Recompute and store both block checksums and the standard frame CRC.
    pub fn reset_checksums(&mut self) {
        self.reset_checksums_with(CrcKind::Standard);
    }

    /// Recompute and store both block checksums and a frame CRC of `kind`.
    pub fn reset_checksums_with(&mut self, kind: CrcKind) {
        for block in 0..NUM_BLOCKS {
            let a = self.calculate_checksum_a(block, 0);
            let b = self.calculate_checksum_b(block, 0);
            self.set_checksum_a(block, a);
            self.set_checksum_b(block, b);
        }
        let crc = self.crc(kind, 0);
        self.set_crc32(crc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{first_adc_word, CHANNELS_PER_FRAME, FRAME_WORDS};

    fn sample_frame() -> Frame {
        let mut frame = Frame::new();
        frame.set_version(1);
        frame.set_fiber_no(3);
        frame.set_timestamp(0x0000_0123_4567_89AB);
        for i in 0..CHANNELS_PER_FRAME {
            frame.set_flat_channel(i, (i as u16 * 37 + 250) & 0xFFF);
        }
        frame.reset_checksums();
        frame
    }

    fn le_bytes(frame: &Frame, words: usize) -> Vec<u8> {
        frame.as_words()[..words]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect()
    }

    #[test]
    fn frame_crc_covers_every_word_but_the_trailer() {
        let frame = sample_frame();
        let bytes = le_bytes(&frame, FRAME_WORDS - 1);
        assert_eq!(bytes.len(), 464);
        assert_eq!(frame.crc32_standard(0), crc32fast::hash(&bytes));
        assert_eq!(frame.crc32(), crc32fast::hash(&bytes));
    }

    #[test]
    fn legacy_crc_stops_one_word_early() {
        let mut frame = sample_frame();
        let bytes = le_bytes(&frame, FRAME_WORDS - 2);
        assert_eq!(bytes.len(), 460);
        assert_eq!(frame.crc32_standard_legacy(0), crc32fast::hash(&bytes));
        assert_ne!(frame.crc32_standard_legacy(0), frame.crc32_standard(0));

        // Word 115 is outside the legacy range.
        frame.reset_checksums_with(CrcKind::StandardLegacy);
        frame.as_words_mut()[FRAME_WORDS - 2] ^= 1;
        assert_eq!(frame.crc(CrcKind::StandardLegacy, frame.crc32()), 0);
        assert_ne!(frame.crc(CrcKind::Standard, frame.crc32()), 0);
    }

    #[test]
    fn checksum_a_xors_the_even_groups() {
        let mut frame = Frame::new();
        let base = first_adc_word(0);
        frame.as_words_mut()[base] = 0x0001_0002;
        frame.as_words_mut()[base + 7] = 0x0004_0008;
        // Odd group words are ignored by checksum A.
        frame.as_words_mut()[base + 3] = 0xFFFF_FFFF;
        assert_eq!(frame.calculate_checksum_a(0, 0), 0x0001 ^ 0x0002 ^ 0x0004 ^ 0x0008);
        assert_eq!(frame.calculate_checksum_a(1, 0), 0);
    }

    #[test]
    fn checksum_b_negates_the_odd_group_sum() {
        let mut frame = Frame::new();
        let base = first_adc_word(3);
        frame.as_words_mut()[base + 3] = 0x0001_0002;
        frame.as_words_mut()[base + 23] = 0xFFFF_0000;
        // Even group words are ignored by checksum B.
        frame.as_words_mut()[base] = 0x1234_5678;
        let sum = 1u16.wrapping_add(2).wrapping_add(0xFFFF);
        assert_eq!(frame.calculate_checksum_b(3, 0), sum.wrapping_neg());
    }

    #[test]
    fn stored_checksums_self_cancel() {
        let frame = sample_frame();
        for block in 0..NUM_BLOCKS {
            assert_eq!(frame.calculate_checksum_a(block, frame.checksum_a(block)), 0);
            assert_eq!(frame.calculate_checksum_b(block, frame.checksum_b(block)), 0);
        }
        assert_eq!(frame.crc(CrcKind::Standard, frame.crc32()), 0);
    }

    #[test]
    fn bit_serial_crc_self_cancels_when_stamped() {
        let mut frame = sample_frame();
        frame.reset_checksums_with(CrcKind::BitSerial);
        assert_eq!(frame.crc(CrcKind::BitSerial, frame.crc32()), 0);
        assert_eq!(frame.crc32(), frame.crc32_bitserial(0, CRC32_POLYNOMIAL));
    }

    #[test]
    fn bit_serial_crc_of_a_zero_frame_is_zero() {
        assert_eq!(Frame::new().crc32_bitserial(0, CRC32_POLYNOMIAL), 0);
    }

    #[test]
    fn bit_serial_crc_feeds_word_zero_through_the_polynomial() {
        let mut frame = Frame::new();
        frame.as_words_mut()[0] = 1;
        // One reduction on load, then the register keeps shifting.
        let mut reg = 1 ^ CRC32_POLYNOMIAL;
        for _ in 0..(FRAME_WORDS - 2) * 32 {
            let out = reg & 1;
            reg >>= 1;
            if out == 1 {
                reg ^= CRC32_POLYNOMIAL;
            }
        }
        assert_eq!(frame.crc32_bitserial(0, CRC32_POLYNOMIAL), reg);
    }

    #[test]
    fn every_single_bit_flip_breaks_both_crcs() {
        let frame = sample_frame();
        let mut serial = frame.clone();
        serial.reset_checksums_with(CrcKind::BitSerial);

        for word in 0..FRAME_WORDS - 1 {
            for bit in 0..32 {
                let mut corrupt = frame.clone();
                corrupt.as_words_mut()[word] ^= 1 << bit;
                assert_ne!(corrupt.crc(CrcKind::Standard, corrupt.crc32()), 0);

                let mut corrupt = serial.clone();
                corrupt.as_words_mut()[word] ^= 1 << bit;
                assert_ne!(corrupt.crc(CrcKind::BitSerial, corrupt.crc32()), 0);
            }
        }
    }

    #[test]
    fn payload_edit_without_reset_is_detected() {
        let mut frame = sample_frame();
        frame.set_channel(2, 4, 5, frame.channel(2, 4, 5) ^ 1);

        let bad_a = (0..NUM_BLOCKS)
            .filter(|b| frame.calculate_checksum_a(*b, frame.checksum_a(*b)) != 0)
            .count();
        let bad_b = (0..NUM_BLOCKS)
            .filter(|b| frame.calculate_checksum_b(*b, frame.checksum_b(*b)) != 0)
            .count();
        assert_eq!(bad_a + bad_b, 1);
        assert_ne!(frame.crc(CrcKind::Standard, frame.crc32()), 0);

        frame.reset_checksums();
        assert_eq!(frame.crc(CrcKind::Standard, frame.crc32()), 0);
    }
}
