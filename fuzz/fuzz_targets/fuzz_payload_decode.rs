#![no_main]
use libfuzzer_sys::fuzz_target;
use rover_core::payload::{Command, CommandResponse, LineSensorData, SpeedData};

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must either fail cleanly or re-encode to the same bytes.
    if let Ok(rec) = SpeedData::from_bytes(data) {
        assert_eq!(&rec.to_bytes()[..], data);
    }
    if let Ok(rec) = CommandResponse::from_bytes(data) {
        assert_eq!(&rec.to_bytes()[..], data);
    }
    if let Ok(rec) = Command::from_bytes(data) {
        assert_eq!(&rec.to_bytes()[..], data);
    }
    let _ = LineSensorData::from_bytes(data);
});
