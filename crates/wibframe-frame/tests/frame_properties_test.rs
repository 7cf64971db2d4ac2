//! Property tests over arbitrary frame contents.

use std::io::Cursor;

use proptest::prelude::*;
use wibframe_frame::{
    decode_frame, encode_frame, CrcKind, Frame, FrameReader, FrameWriter, CHANNELS_PER_FRAME,
    FRAME_WORDS, NUM_BLOCKS,
};

fn arbitrary_frame() -> impl Strategy<Value = Frame> {
    prop::collection::vec(any::<u32>(), FRAME_WORDS).prop_map(|words| {
        let mut array = [0u32; FRAME_WORDS];
        array.copy_from_slice(&words);
        Frame::from_words(array)
    })
}

proptest! {
    #[test]
    fn prop_bytes_round_trip(frame in arbitrary_frame()) {
        let mut buf = bytes::BytesMut::new();
        encode_frame(&frame, &mut buf);
        prop_assert_eq!(decode_frame(&buf).unwrap(), frame);
    }

    #[test]
    fn prop_writer_reader_round_trip(frames in prop::collection::vec(arbitrary_frame(), 1..6)) {
        let mut writer = FrameWriter::new(Vec::new());
        for frame in &frames {
            writer.write_frame(frame).unwrap();
        }
        writer.finish().unwrap();

        let mut reader = FrameReader::new(Cursor::new(writer.into_inner()));
        prop_assert_eq!(reader.frame_count().unwrap(), frames.len() as u64);
        for (i, frame) in frames.iter().enumerate().rev() {
            prop_assert_eq!(&reader.load(i as u64).unwrap(), frame);
        }
    }

    #[test]
    fn prop_channel_writes_are_isolated(
        frame in arbitrary_frame(),
        index in 0..CHANNELS_PER_FRAME,
        value in 0u16..4096,
    ) {
        let mut edited = frame.clone();
        edited.set_flat_channel(index, value);

        prop_assert_eq!(edited.flat_channel(index), value);
        for other in (0..CHANNELS_PER_FRAME).filter(|i| *i != index) {
            prop_assert_eq!(edited.flat_channel(other), frame.flat_channel(other));
        }
        for block in 0..NUM_BLOCKS {
            prop_assert_eq!(edited.checksum_a(block), frame.checksum_a(block));
            prop_assert_eq!(edited.checksum_b(block), frame.checksum_b(block));
        }
        prop_assert_eq!(&edited.as_words()[..4], &frame.as_words()[..4]);
    }

    #[test]
    fn prop_reset_checksums_always_self_cancels(frame in arbitrary_frame()) {
        let mut frame = frame;
        frame.reset_checksums();
        for block in 0..NUM_BLOCKS {
            prop_assert_eq!(frame.calculate_checksum_a(block, frame.checksum_a(block)), 0);
            prop_assert_eq!(frame.calculate_checksum_b(block, frame.checksum_b(block)), 0);
        }
        prop_assert_eq!(frame.crc(CrcKind::Standard, frame.crc32()), 0);
    }

    #[test]
    fn prop_single_bit_corruption_is_detected(
        frame in arbitrary_frame(),
        word in 0..FRAME_WORDS - 1,
        bit in 0u32..32,
    ) {
        let mut frame = frame;
        frame.reset_checksums();
        frame.as_words_mut()[word] ^= 1 << bit;
        prop_assert_ne!(frame.crc(CrcKind::Standard, frame.crc32()), 0);
    }
}
