//! Out-of-range indices must blame the calling line, not the layout module.
//!
//! Kept in its own test binary: the panic hook is process-wide.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use wibframe_frame::{Frame, CHANNELS_PER_FRAME, NUM_BLOCKS};

static LAST_PANIC_FILE: Mutex<Option<String>> = Mutex::new(None);

fn panic_file(f: impl FnOnce()) -> String {
    *LAST_PANIC_FILE.lock().unwrap() = None;
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    assert!(result.is_err(), "call should panic");
    LAST_PANIC_FILE
        .lock()
        .unwrap()
        .take()
        .expect("panic location should be recorded")
}

#[test]
fn bad_indices_panic_at_the_caller() {
    panic::set_hook(Box::new(|info| {
        if let Some(location) = info.location() {
            *LAST_PANIC_FILE.lock().unwrap() = Some(location.file().to_string());
        }
    }));

    let mut frame = Frame::new();
    let here = file!();

    let stream = panic_file(|| {
        frame.channel(0, 8, 0);
    });
    assert_eq!(stream, here);
    let channel = panic_file(|| {
        frame.channel(0, 0, 8);
    });
    assert_eq!(channel, here);
    let flat = panic_file(|| {
        frame.flat_channel(CHANNELS_PER_FRAME);
    });
    assert_eq!(flat, here);
    let s1 = panic_file(|| {
        frame.s1_error(NUM_BLOCKS);
    });
    assert_eq!(s1, here);
    let hdr = panic_file(|| {
        frame.hdr(0, 8);
    });
    assert_eq!(hdr, here);
    let set = panic_file(|| frame.clone().set_channel(NUM_BLOCKS, 0, 0, 1));
    assert_eq!(set, here);
    let checksum = panic_file(|| frame.set_checksum_a(NUM_BLOCKS, 0));
    assert_eq!(checksum, here);

    let _ = panic::take_hook();
}
