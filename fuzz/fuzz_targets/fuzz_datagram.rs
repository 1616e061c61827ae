#![no_main]

use libfuzzer_sys::fuzz_target;
use smartswitch_protocol::core::tlv::parse_tlvs;
use smartswitch_protocol::SwitchCodec;

fuzz_target!(|data: &[u8]| {
    // Inbound datagrams are attacker-controlled: decipher, parse, render
    if let Ok(packet) = SwitchCodec::new().open(data) {
        for tlv in &packet.tlvs {
            let _ = tlv.render();
        }
    }
    for tlv in parse_tlvs(data) {
        let _ = tlv.render();
    }
});
