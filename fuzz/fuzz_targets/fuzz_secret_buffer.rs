#![no_main]

use libfuzzer_sys::fuzz_target;
use sflock_core::SecretBuffer;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the capacity, the rest is split into edits
    let mut buffer = SecretBuffer::with_capacity(data[0] as usize);

    for chunk in data[1..].chunks(3) {
        let before = buffer.len();

        if chunk[0] == 0x7f {
            let removed = buffer.delete_last();
            assert_eq!(removed, before > 0);
            assert!(buffer.len() < before || before == 0);
            continue;
        }

        match buffer.insert(chunk) {
            Ok(()) => assert_eq!(buffer.len(), before + chunk.len()),
            Err(_) => assert_eq!(buffer.len(), before),
        }

        assert!(buffer.len() <= buffer.capacity());
        assert_eq!(buffer.snapshot_for_display(), buffer.len());
        assert_eq!(buffer.commit().len(), buffer.len());
    }

    buffer.clear();
    assert!(buffer.is_empty());
});
