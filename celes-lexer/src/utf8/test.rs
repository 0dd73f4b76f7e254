use pretty_assertions::assert_eq;

use super::next;

#[test]
fn ascii() {
    assert_eq!(next(b"abc", 0), Some(('a', 1)));
    assert_eq!(next(b"abc", 2), Some(('c', 1)));
}

#[test]
fn multi_byte_forms() {
    let s = "é€𝄞";
    let b = s.as_bytes();
    assert_eq!(next(b, 0), Some(('é', 2)));
    assert_eq!(next(b, 2), Some(('€', 3)));
    assert_eq!(next(b, 5), Some(('𝄞', 4)));
}

#[test]
fn end_of_buffer() {
    assert_eq!(next(b"", 0), None);
    assert_eq!(next(b"a", 1), None);
}

#[test]
fn zero_byte_terminates() {
    assert_eq!(next(b"\0abc", 0), None);
}

#[test]
fn bad_continuation() {
    // 0xC3 expects a continuation byte, '(' is not one
    assert_eq!(next(&[0xC3, 0x28], 0), None);
    // truncated 3-byte sequence
    assert_eq!(next(&[0xE2, 0x82], 0), None);
}

#[test]
fn stray_continuation_and_bad_lead() {
    assert_eq!(next(&[0x80], 0), None);
    assert_eq!(next(&[0xFF, 0x80], 0), None);
}

#[test]
fn overlong_zero() {
    // 0xC0 0x80 assembles to zero and is rejected
    assert_eq!(next(&[0xC0, 0x80], 0), None);
}
