#![no_main]

use libfuzzer_sys::fuzz_target;
use smartswitch_protocol::Packet;

fuzz_target!(|data: &[u8]| {
    // Tolerant and strict header parsing must never panic
    let tolerant = Packet::from_bytes(data);
    if let Ok(strict) = Packet::try_from_bytes(data) {
        assert_eq!(strict, tolerant);
        // Whatever parsed must serialize again
        let _ = strict.to_bytes();
    }
});
