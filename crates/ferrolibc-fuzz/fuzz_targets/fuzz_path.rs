#![no_main]
use ferrolibc_core::path::{FixedDirectory, abspath, cleanname, is_absolute, relpath};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (file, reference) = (&data[..split], data.get(split + 1..).unwrap_or_default());

    let mut once = file.to_vec();
    cleanname(&mut once);
    assert!(!once.is_empty());
    assert!(!once.windows(2).any(|w| w == b"//"));
    let mut twice = once.clone();
    cleanname(&mut twice);
    assert_eq!(once, twice);

    let cwd = FixedDirectory::new("/fuzz/cwd");
    if let Ok(abs) = abspath(file, None, &cwd) {
        assert!(is_absolute(&abs));
    }
    let reference = (!reference.is_empty()).then_some(reference);
    let _ = relpath(file, reference, &cwd);
});
