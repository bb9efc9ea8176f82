#![no_main]
use libfuzzer_sys::fuzz_target;
use scale_hardware::{WireFormat, decode_line};

fuzz_target!(|input: (&str, u8, u8, u8)| {
    let (line, marker_offset, header_width, magnitude_token) = input;
    let format = WireFormat {
        marker_offset: usize::from(marker_offset),
        stable_code: b'S',
        header_width: usize::from(header_width),
        magnitude_token: usize::from(magnitude_token),
    };
    if let Ok(reading) = decode_line(line, &format) {
        assert!(reading.weight.is_finite());
        assert!(reading.weight >= 0.0);
    }
    let _ = decode_line(line, &WireFormat::STATUS_BLOCK);
});
