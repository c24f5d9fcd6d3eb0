//! Small text transforms used to build puzzle fixtures.

/// Shift letters by `shift` places (wrapping within their case) and digits by
/// `shift` places modulo 10. Other characters pass through unchanged.
pub fn caesar_shift(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                rotate(c, b'a', 26, shift)
            } else if c.is_ascii_uppercase() {
                rotate(c, b'A', 26, shift)
            } else if c.is_ascii_digit() {
                rotate(c, b'0', 10, shift)
            } else {
                c
            }
        })
        .collect()
}

/// Undo [`caesar_shift`] with the same key.
pub fn caesar_unshift(text: &str, shift: u8) -> String {
    caesar_shift(text, 26 - shift % 26)
        .chars()
        .zip(text.chars())
        .map(|(shifted, original)| {
            if original.is_ascii_digit() {
                rotate(original, b'0', 10, 10 - shift % 10)
            } else {
                shifted
            }
        })
        .collect()
}

/// Reverse a string by characters.
pub fn mirror(text: &str) -> String {
    text.chars().rev().collect()
}

fn rotate(c: char, base: u8, modulus: u8, shift: u8) -> char {
    let offset = (c as u8 - base + shift % modulus) % modulus;
    (base + offset) as char
}
