use crate::bits::{self, get_bits, set_bits};

/// Number of 32-bit words in one frame.
pub const FRAME_WORDS: usize = 117;

/// Number of bytes in one serialized frame.
pub const FRAME_BYTES: usize = FRAME_WORDS * 4;

/// Number of WIB header words.
pub const HEADER_WORDS: usize = 4;

/// Number of COLDATA blocks per frame.
pub const NUM_BLOCKS: usize = 4;

/// Number of words per COLDATA block (header + channel data).
pub const BLOCK_WORDS: usize = 28;

/// Number of header words at the start of each COLDATA block.
pub const BLOCK_HEADER_WORDS: usize = 4;

/// Number of channel data words per COLDATA block.
pub const ADC_WORDS_PER_BLOCK: usize = bits::CHANNEL_WORDS;

/// Streams (ADCs) per block.
pub const STREAMS_PER_BLOCK: usize = 8;

/// Channels per stream.
pub const CHANNELS_PER_STREAM: usize = 8;

/// Channels per block.
pub const CHANNELS_PER_BLOCK: usize = STREAMS_PER_BLOCK * CHANNELS_PER_STREAM;

/// Channels per frame.
pub const CHANNELS_PER_FRAME: usize = NUM_BLOCKS * CHANNELS_PER_BLOCK;

/// Number of 4-bit HDR nibbles per block.
pub const HDR_NIBBLES: usize = 8;

/// Index of the trailing CRC word.
pub const CRC_WORD: usize = FRAME_WORDS - 1;

/// An inclusive bit range inside one word of the frame (or of a block,
/// for block-relative fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub word: usize,
    pub begin: u32,
    pub end: u32,
}

impl Field {
    const fn new(word: usize, begin: u32, end: u32) -> Self {
        Self { word, begin, end }
    }

    /// Width of the field in bits.
    pub const fn width(&self) -> u32 {
        self.end - self.begin + 1
    }

    const fn in_block(self, block: usize) -> Self {
        Self::new(first_block_word(block) + self.word, self.begin, self.end)
    }
}

// WIB header.
pub const SOF: Field = Field::new(0, 0, 7);
pub const VERSION: Field = Field::new(0, 8, 12);
pub const FIBER_NO: Field = Field::new(0, 13, 15);
pub const SLOT_NO: Field = Field::new(0, 16, 20);
pub const CRATE_NO: Field = Field::new(0, 21, 23);
pub const MM: Field = Field::new(1, 0, 0);
pub const OOS: Field = Field::new(1, 1, 1);
pub const WIB_ERRORS: Field = Field::new(1, 16, 31);
pub const TIMESTAMP_LO: Field = Field::new(2, 0, 31);
pub const TIMESTAMP_HI: Field = Field::new(3, 0, 15);
pub const WIB_COUNTER: Field = Field::new(3, 16, 30);
pub const Z: Field = Field::new(3, 31, 31);

// COLDATA block header, relative to the first word of the block.
pub const S1_ERROR: Field = Field::new(0, 0, 3);
pub const S2_ERROR: Field = Field::new(0, 4, 7);
pub const CHECKSUM_A_LO: Field = Field::new(0, 16, 23);
pub const CHECKSUM_B_LO: Field = Field::new(0, 24, 31);
pub const CHECKSUM_A_HI: Field = Field::new(1, 0, 7);
pub const CHECKSUM_B_HI: Field = Field::new(1, 8, 15);
pub const CONVERT_COUNT: Field = Field::new(1, 16, 31);
pub const ERROR_REGISTER: Field = Field::new(2, 0, 15);
pub const HDR_WORD: usize = 3;

/// Ranges that carry no field and are zeroed by [`Frame::clear_reserved`].
pub const RESERVED_HEADER: [Field; 2] = [Field::new(0, 24, 31), Field::new(1, 2, 15)];
pub const RESERVED_BLOCK: [Field; 2] = [Field::new(0, 8, 15), Field::new(2, 16, 31)];

const fn first_block_word(block: usize) -> usize {
    HEADER_WORDS + block * BLOCK_WORDS
}

/// First frame word of the channel data of `block`.
pub const fn first_adc_word(block: usize) -> usize {
    first_block_word(block) + BLOCK_HEADER_WORDS
}

#[track_caller]
fn check_index(what: &str, index: usize, bound: usize) {
    assert!(
        index < bound,
        "{what} index {index} out of range (expected < {bound})"
    );
}

/// One WIB frame held as an owned array of words.
///
/// All accessors compute word indices and bit offsets from the layout
/// constants in this module. Setters never touch checksums; call
/// [`Frame::reset_checksums`] after editing.
///
/// Index arguments (block, stream, channel, HDR nibble) outside their range
/// are a caller bug and panic.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    words: [u32; FRAME_WORDS],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("version", &self.version())
            .field("fiber_no", &self.fiber_no())
            .field("slot_no", &self.slot_no())
            .field("crate_no", &self.crate_no())
            .field("timestamp", &self.timestamp())
            .field("crc32", &format_args!("{:#010x}", self.crc32()))
            .finish_non_exhaustive()
    }
}

impl Frame {
    /// Create an all-zero frame.
    pub const fn new() -> Self {
        Self {
            words: [0; FRAME_WORDS],
        }
    }

    /// Wrap an existing word array.
    pub const fn from_words(words: [u32; FRAME_WORDS]) -> Self {
        Self { words }
    }

    /// The raw words of the frame.
    pub fn as_words(&self) -> &[u32; FRAME_WORDS] {
        &self.words
    }

    /// Mutable access to the raw words. Checksums are not refreshed.
    pub fn as_words_mut(&mut self) -> &mut [u32; FRAME_WORDS] {
        &mut self.words
    }

    /// Read a field given in absolute frame coordinates.
    pub fn field(&self, field: Field) -> u32 {
        get_bits(self.words[field.word], field.begin, field.end)
    }

    /// Write a field given in absolute frame coordinates.
    pub fn set_field(&mut self, field: Field, value: u32) {
        set_bits(&mut self.words[field.word], value, field.begin, field.end);
    }

    /// Read a block-relative field of `block`.
    #[track_caller]
    pub fn block_field(&self, block: usize, field: Field) -> u32 {
        check_index("block", block, NUM_BLOCKS);
        self.field(field.in_block(block))
    }

    #[track_caller]
    fn set_block_field(&mut self, block: usize, field: Field, value: u32) {
        check_index("block", block, NUM_BLOCKS);
        self.set_field(field.in_block(block), value);
    }

    /// The 24 channel data words of `block`.
    #[track_caller]
    pub fn adc_words(&self, block: usize) -> &[u32] {
        check_index("block", block, NUM_BLOCKS);
        let start = first_adc_word(block);
        &self.words[start..start + ADC_WORDS_PER_BLOCK]
    }

    #[track_caller]
    fn adc_words_mut(&mut self, block: usize) -> &mut [u32] {
        check_index("block", block, NUM_BLOCKS);
        let start = first_adc_word(block);
        &mut self.words[start..start + ADC_WORDS_PER_BLOCK]
    }

    // WIB header.

    pub fn sof(&self) -> u8 {
        self.field(SOF) as u8
    }

    pub fn set_sof(&mut self, sof: u8) {
        self.set_field(SOF, sof.into());
    }

    pub fn version(&self) -> u8 {
        self.field(VERSION) as u8
    }

    pub fn set_version(&mut self, version: u8) {
        self.set_field(VERSION, version.into());
    }

    pub fn fiber_no(&self) -> u8 {
        self.field(FIBER_NO) as u8
    }

    pub fn set_fiber_no(&mut self, fiber_no: u8) {
        self.set_field(FIBER_NO, fiber_no.into());
    }

    pub fn slot_no(&self) -> u8 {
        self.field(SLOT_NO) as u8
    }

    pub fn set_slot_no(&mut self, slot_no: u8) {
        self.set_field(SLOT_NO, slot_no.into());
    }

    pub fn crate_no(&self) -> u8 {
        self.field(CRATE_NO) as u8
    }

    pub fn set_crate_no(&mut self, crate_no: u8) {
        self.set_field(CRATE_NO, crate_no.into());
    }

    pub fn mm(&self) -> bool {
        self.field(MM) != 0
    }

    pub fn set_mm(&mut self, mm: bool) {
        self.set_field(MM, mm.into());
    }

    pub fn oos(&self) -> bool {
        self.field(OOS) != 0
    }

    pub fn set_oos(&mut self, oos: bool) {
        self.set_field(OOS, oos.into());
    }

    pub fn wib_errors(&self) -> u16 {
        self.field(WIB_ERRORS) as u16
    }

    pub fn set_wib_errors(&mut self, wib_errors: u16) {
        self.set_field(WIB_ERRORS, wib_errors.into());
    }

    /// Timestamp mode flag. When set, the timestamp is 48 bits and the
    /// upper header bits hold the WIB counter.
    pub fn z(&self) -> bool {
        self.field(Z) != 0
    }

    pub fn set_z(&mut self, z: bool) {
        self.set_field(Z, z.into());
    }

    /// The frame timestamp: 48 bits when `z` is set, otherwise 63 bits with
    /// the WIB counter field holding bits 48..63.
    pub fn timestamp(&self) -> u64 {
        let ts = u64::from(self.field(TIMESTAMP_LO)) | u64::from(self.field(TIMESTAMP_HI)) << 32;
        if self.z() {
            ts
        } else {
            ts | u64::from(self.field(WIB_COUNTER)) << 48
        }
    }

    /// Store a timestamp. The bits above 48 are only kept when `z` is clear.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.set_field(TIMESTAMP_LO, timestamp as u32);
        self.set_field(TIMESTAMP_HI, (timestamp >> 32) as u32);
        if !self.z() {
            self.set_field(WIB_COUNTER, (timestamp >> 48) as u32);
        }
    }

    /// The WIB counter, or 0 while `z` is clear.
    pub fn wib_counter(&self) -> u16 {
        if self.z() {
            self.field(WIB_COUNTER) as u16
        } else {
            0
        }
    }

    /// Write the raw 15-bit counter field. While `z` is clear this overwrites
    /// timestamp bits 48..63.
    pub fn set_wib_counter(&mut self, counter: u16) {
        self.set_field(WIB_COUNTER, counter.into());
    }

    // COLDATA block headers.

    #[track_caller]
    pub fn s1_error(&self, block: usize) -> u8 {
        self.block_field(block, S1_ERROR) as u8
    }

    #[track_caller]
    pub fn set_s1_error(&mut self, block: usize, value: u8) {
        self.set_block_field(block, S1_ERROR, value.into());
    }

    #[track_caller]
    pub fn s2_error(&self, block: usize) -> u8 {
        self.block_field(block, S2_ERROR) as u8
    }

    #[track_caller]
    pub fn set_s2_error(&mut self, block: usize, value: u8) {
        self.set_block_field(block, S2_ERROR, value.into());
    }

    /// Stored checksum A of `block`, reassembled from its two bytes.
    #[track_caller]
    pub fn checksum_a(&self, block: usize) -> u16 {
        (self.block_field(block, CHECKSUM_A_LO) | self.block_field(block, CHECKSUM_A_HI) << 8) as u16
    }

    #[track_caller]
    pub fn set_checksum_a(&mut self, block: usize, checksum: u16) {
        self.set_block_field(block, CHECKSUM_A_LO, checksum.into());
        self.set_block_field(block, CHECKSUM_A_HI, u32::from(checksum) >> 8);
    }

    /// Stored checksum B of `block`, reassembled from its two bytes.
    #[track_caller]
    pub fn checksum_b(&self, block: usize) -> u16 {
        (self.block_field(block, CHECKSUM_B_LO) | self.block_field(block, CHECKSUM_B_HI) << 8) as u16
    }

    #[track_caller]
    pub fn set_checksum_b(&mut self, block: usize, checksum: u16) {
        self.set_block_field(block, CHECKSUM_B_LO, checksum.into());
        self.set_block_field(block, CHECKSUM_B_HI, u32::from(checksum) >> 8);
    }

    #[track_caller]
    pub fn coldata_convert_count(&self, block: usize) -> u16 {
        self.block_field(block, CONVERT_COUNT) as u16
    }

    #[track_caller]
    pub fn set_coldata_convert_count(&mut self, block: usize, count: u16) {
        self.set_block_field(block, CONVERT_COUNT, count.into());
    }

    #[track_caller]
    pub fn error_register(&self, block: usize) -> u16 {
        self.block_field(block, ERROR_REGISTER) as u16
    }

    #[track_caller]
    pub fn set_error_register(&mut self, block: usize, value: u16) {
        self.set_block_field(block, ERROR_REGISTER, value.into());
    }

    /// HDR nibble `n` (0..8) of `block`.
    #[track_caller]
    pub fn hdr(&self, block: usize, n: usize) -> u8 {
        check_index("hdr", n, HDR_NIBBLES);
        let begin = 4 * n as u32;
        self.block_field(block, Field::new(HDR_WORD, begin, begin + 3)) as u8
    }

    #[track_caller]
    pub fn set_hdr(&mut self, block: usize, n: usize, value: u8) {
        check_index("hdr", n, HDR_NIBBLES);
        let begin = 4 * n as u32;
        self.set_block_field(block, Field::new(HDR_WORD, begin, begin + 3), value.into());
    }

    /// Channel `ch` of stream `adc` in `block`.
    #[track_caller]
    pub fn channel(&self, block: usize, adc: usize, ch: usize) -> u16 {
        check_index("stream", adc, STREAMS_PER_BLOCK);
        check_index("channel", ch, CHANNELS_PER_STREAM);
        bits::get_channel(self.adc_words(block), adc, ch)
    }

    /// Store the low 12 bits of `value` in channel `ch` of stream `adc`.
    #[track_caller]
    pub fn set_channel(&mut self, block: usize, adc: usize, ch: usize, value: u16) {
        check_index("stream", adc, STREAMS_PER_BLOCK);
        check_index("channel", ch, CHANNELS_PER_STREAM);
        bits::set_channel(self.adc_words_mut(block), adc, ch, value);
    }

    /// Channel addressed by its flat index (0..256) across the frame.
    #[track_caller]
    pub fn flat_channel(&self, index: usize) -> u16 {
        let (block, adc, ch) = split_flat_channel(index);
        self.channel(block, adc, ch)
    }

    #[track_caller]
    pub fn set_flat_channel(&mut self, index: usize, value: u16) {
        let (block, adc, ch) = split_flat_channel(index);
        self.set_channel(block, adc, ch, value);
    }

    // Trailer.

    /// Stored frame CRC.
    pub fn crc32(&self) -> u32 {
        self.words[CRC_WORD]
    }

    pub fn set_crc32(&mut self, crc: u32) {
        self.words[CRC_WORD] = crc;
    }

    /// Zero every bit range not assigned to a field.
    pub fn clear_reserved(&mut self) {
        for field in RESERVED_HEADER {
            self.set_field(field, 0);
        }
        for block in 0..NUM_BLOCKS {
            for field in RESERVED_BLOCK {
                self.set_block_field(block, field, 0);
            }
        }
    }
}

#[track_caller]
fn split_flat_channel(index: usize) -> (usize, usize, usize) {
    check_index("flat channel", index, CHANNELS_PER_FRAME);
    (
        index / CHANNELS_PER_BLOCK,
        (index % CHANNELS_PER_BLOCK) / CHANNELS_PER_STREAM,
        index % CHANNELS_PER_STREAM,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_fields() -> Vec<Field> {
        vec![
            SOF,
            VERSION,
            FIBER_NO,
            SLOT_NO,
            CRATE_NO,
            MM,
            OOS,
            WIB_ERRORS,
            TIMESTAMP_LO,
            TIMESTAMP_HI,
            WIB_COUNTER,
            Z,
        ]
    }

    fn block_fields() -> Vec<Field> {
        let mut fields = vec![
            S1_ERROR,
            S2_ERROR,
            CHECKSUM_A_LO,
            CHECKSUM_B_LO,
            CHECKSUM_A_HI,
            CHECKSUM_B_HI,
            CONVERT_COUNT,
            ERROR_REGISTER,
        ];
        fields.extend((0..8).map(|n| Field::new(HDR_WORD, 4 * n, 4 * n + 3)));
        fields
    }

    fn coverage(fields: &[Field], words: usize) -> Vec<u32> {
        let mut cover = vec![0u32; words];
        for field in fields {
            let mut bits = 0;
            set_bits(&mut bits, u32::MAX, field.begin, field.end);
            assert_eq!(cover[field.word] & bits, 0, "{field:?} overlaps");
            cover[field.word] |= bits;
        }
        cover
    }

    #[test]
    fn header_fields_and_reserved_ranges_tile_the_header() {
        let mut fields = header_fields();
        fields.extend(RESERVED_HEADER);
        let cover = coverage(&fields, HEADER_WORDS);
        assert!(cover.iter().all(|w| *w == u32::MAX));
    }

    #[test]
    fn block_fields_and_reserved_ranges_tile_the_block_header() {
        let mut fields = block_fields();
        fields.extend(RESERVED_BLOCK);
        let cover = coverage(&fields, BLOCK_HEADER_WORDS);
        assert!(cover.iter().all(|w| *w == u32::MAX));
    }

    #[test]
    fn header_accessors_round_trip() {
        let mut frame = Frame::new();
        frame.set_sof(0xBC);
        frame.set_version(17);
        frame.set_fiber_no(5);
        frame.set_slot_no(19);
        frame.set_crate_no(6);
        frame.set_mm(true);
        frame.set_oos(true);
        frame.set_wib_errors(0xBEEF);

        assert_eq!(frame.sof(), 0xBC);
        assert_eq!(frame.version(), 17);
        assert_eq!(frame.fiber_no(), 5);
        assert_eq!(frame.slot_no(), 19);
        assert_eq!(frame.crate_no(), 6);
        assert!(frame.mm());
        assert!(frame.oos());
        assert_eq!(frame.wib_errors(), 0xBEEF);
        assert_eq!(frame.as_words()[0], 0xBC | 17 << 8 | 5 << 13 | 19 << 16 | 6 << 21);
    }

    #[test]
    fn narrow_fields_truncate_wide_values() {
        let mut frame = Frame::new();
        frame.set_fiber_no(0xFF);
        assert_eq!(frame.fiber_no(), 7);
        assert_eq!(frame.slot_no(), 0);
        assert_eq!(frame.version(), 0);
    }

    #[test]
    fn timestamp_keeps_high_bits_when_z_is_clear() {
        let mut frame = Frame::new();
        let ts = 0x1234_5678_9ABC_DEF0 & 0x7FFF_FFFF_FFFF_FFFF;
        frame.set_timestamp(ts);
        assert_eq!(frame.timestamp(), ts);
        assert_eq!(frame.wib_counter(), 0);
    }

    #[test]
    fn timestamp_is_48_bits_when_z_is_set() {
        let mut frame = Frame::new();
        frame.set_z(true);
        frame.set_wib_counter(0x1ABC);
        frame.set_timestamp(0xFFFF_1234_5678_9ABC);

        assert_eq!(frame.timestamp(), 0x1234_5678_9ABC);
        assert_eq!(frame.wib_counter(), 0x1ABC);
    }

    #[test]
    fn checksums_are_split_across_two_words() {
        let mut frame = Frame::new();
        frame.set_checksum_a(2, 0xA1A2);
        frame.set_checksum_b(2, 0xB1B2);

        let base = first_adc_word(2) - BLOCK_HEADER_WORDS;
        assert_eq!(frame.as_words()[base], 0xB2A2 << 16);
        assert_eq!(frame.as_words()[base + 1], 0xB1A1);
        assert_eq!(frame.checksum_a(2), 0xA1A2);
        assert_eq!(frame.checksum_b(2), 0xB1B2);
        assert_eq!(frame.checksum_a(1), 0);
    }

    #[test]
    fn block_header_accessors_round_trip() {
        let mut frame = Frame::new();
        for block in 0..NUM_BLOCKS {
            let b = block as u8;
            frame.set_s1_error(block, b + 1);
            frame.set_s2_error(block, b + 2);
            frame.set_coldata_convert_count(block, 1000 + u16::from(b));
            frame.set_error_register(block, 0xE000 | u16::from(b));
            for n in 0..HDR_NIBBLES {
                frame.set_hdr(block, n, (n as u8 + b) & 0xF);
            }
        }
        for block in 0..NUM_BLOCKS {
            let b = block as u8;
            assert_eq!(frame.s1_error(block), b + 1);
            assert_eq!(frame.s2_error(block), b + 2);
            assert_eq!(frame.coldata_convert_count(block), 1000 + u16::from(b));
            assert_eq!(frame.error_register(block), 0xE000 | u16::from(b));
            for n in 0..HDR_NIBBLES {
                assert_eq!(frame.hdr(block, n), (n as u8 + b) & 0xF);
            }
        }
    }

    #[test]
    fn flat_channels_map_onto_blocks_streams_and_channels() {
        let mut frame = Frame::new();
        for i in 0..CHANNELS_PER_FRAME {
            frame.set_flat_channel(i, 255 - i as u16 % 256);
        }
        for i in 0..CHANNELS_PER_FRAME {
            assert_eq!(frame.flat_channel(i), 255 - i as u16 % 256);
        }
        assert_eq!(frame.channel(1, 2, 3), frame.flat_channel(64 + 2 * 8 + 3));
    }

    #[test]
    fn channel_edits_stay_inside_their_block() {
        let mut frame = Frame::new();
        frame.set_channel(1, 7, 7, 0xFFF);

        for block in [0, 2, 3] {
            assert!(frame.adc_words(block).iter().all(|w| *w == 0));
        }
        assert_eq!(frame.checksum_a(1), 0);
        assert_eq!(frame.checksum_a(2), 0);
        assert_eq!(frame.as_words()[first_adc_word(2) - BLOCK_HEADER_WORDS], 0);
    }

    #[test]
    fn clear_reserved_only_touches_reserved_bits() {
        let mut frame = Frame::from_words([u32::MAX; FRAME_WORDS]);
        frame.clear_reserved();

        let words = frame.as_words();
        assert_eq!(words[0], 0x00FF_FFFF);
        assert_eq!(words[1], 0xFFFF_0003);
        for block in 0..NUM_BLOCKS {
            let base = first_adc_word(block) - BLOCK_HEADER_WORDS;
            assert_eq!(words[base], 0xFFFF_00FF);
            assert_eq!(words[base + 1], u32::MAX);
            assert_eq!(words[base + 2], 0x0000_FFFF);
            assert_eq!(words[base + 3], u32::MAX);
            assert!(frame.adc_words(block).iter().all(|w| *w == u32::MAX));
        }
        assert_eq!(frame.crc32(), u32::MAX);
    }

    #[test]
    #[should_panic(expected = "block index 4 out of range")]
    fn out_of_range_block_panics() {
        Frame::new().s1_error(4);
    }

    #[test]
    #[should_panic(expected = "channel index 8 out of range")]
    fn out_of_range_channel_panics() {
        Frame::new().channel(0, 0, 8);
    }

    #[test]
    #[should_panic(expected = "flat channel index 256 out of range")]
    fn out_of_range_flat_channel_panics() {
        Frame::new().flat_channel(256);
    }
}
