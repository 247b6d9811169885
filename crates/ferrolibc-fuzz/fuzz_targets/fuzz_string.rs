#![no_main]
use ferrolibc_core::string::{
    memchr, memmem, memrchr, strchr, strcmp, strcpy, strlcpy, strlen, strnlen, strrchr, strsep,
    strstr,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (needle_byte, rest) = (data[0], &data[1..]);
    let split = rest.len() / 2;
    let (hay, needle) = rest.split_at(split);

    // Unterminated input: every scan stops at the slice end.
    let len = strlen(hay);
    assert!(len <= hay.len());
    assert_eq!(strnlen(hay, len), len);
    if let Some(i) = strchr(hay, needle_byte).filter(|_| needle_byte != 0) {
        assert!(i <= len);
        assert!(strrchr(hay, needle_byte).is_some_and(|j| j >= i));
    }
    if let Some(i) = memchr(hay, needle_byte, hay.len()) {
        assert_eq!(hay[i], needle_byte);
        assert!(memrchr(hay, needle_byte, hay.len()).is_some_and(|j| j >= i));
    }
    if let Some(i) = memmem(hay, needle) {
        assert_eq!(&hay[i..i + needle.len()], needle);
    }
    if let Some(i) = strstr(hay, needle) {
        assert!(i <= len);
    }
    assert_eq!(strcmp(hay, hay), 0);
    assert_eq!(strcmp(hay, needle).signum(), -strcmp(needle, hay).signum());

    let mut dest = vec![0xEEu8; len + 1];
    assert_eq!(strcpy(&mut dest, hay), len + 1);
    assert_eq!(strlen(&dest), len);

    let mut small = [0u8; 8];
    assert_eq!(strlcpy(&mut small, hay), len);
    assert!(strlen(&small) < small.len());

    let mut buf = hay.to_vec();
    let mut cursor = Some(0);
    while let Some((start, n)) = strsep(&mut buf, &mut cursor, needle) {
        assert!(start + n <= buf.len());
    }
});
