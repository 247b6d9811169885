#![no_main]
use ferrolibc_core::escape::{UnescapeMode, escape, unescape_bytes};
use ferrolibc_core::mode::{HumanModeStyle, humanmode, machinemode};
use ferrolibc_core::size::{SizeMode, humansize, machinesize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(update) = machinemode(text) {
            let mode = update.apply(0o644) & 0o7777;
            let human = humanmode(mode, HumanModeStyle::Symbolic);
            assert!(machinemode(&human).is_ok_and(|u| u.apply(0) == mode));
        }
        if let Ok(bytes) = machinesize(text, SizeMode::Binary) {
            assert!(machinesize(&humansize(bytes, SizeMode::Binary), SizeMode::Binary)
                .is_ok_and(|n| n <= bytes));
        }
    }

    // Escaping stops at the first NUL, so the round trip covers the prefix.
    let prefix = &data[..data.iter().position(|&b| b == 0).unwrap_or(data.len())];
    if let Ok(encoded) = escape(prefix, b'"') {
        let decoded = unescape_bytes(&encoded, UnescapeMode::empty());
        assert!(decoded.is_ok_and(|d| d == prefix));
    }
    for mode in [UnescapeMode::KEEP_UNKNOWN, UnescapeMode::DROP_UNKNOWN | UnescapeMode::RAW] {
        let _ = unescape_bytes(data, mode);
    }
});
