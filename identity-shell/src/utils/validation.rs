//! Input shape checks shared by the credential channels.

use once_cell::sync::Lazy;
use regex::Regex;

/// Six decimal digits: the accepted shape for OTP codes and the admin
/// second factor.
pub static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("Failed to compile code pattern"));

pub fn is_valid_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

/// E.164-style sanity check applied before dispatching a code. Looser than
/// full number validation; the transport is mocked anyway.
pub fn is_valid_dispatch_phone(phone: &str) -> bool {
    if !phone.starts_with('+') || phone.len() < 10 {
        return false;
    }
    phone[1..].chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_must_be_exactly_six_digits() {
        assert!(is_valid_code("123456"));
        assert!(is_valid_code("000000"));
        assert!(!is_valid_code("12345"));
        assert!(!is_valid_code("1234567"));
        assert!(!is_valid_code("12a456"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code(" 123456"));
    }

    #[test]
    fn dispatch_phone_requires_e164_shape() {
        assert!(is_valid_dispatch_phone("+15551234567"));
        assert!(!is_valid_dispatch_phone("15551234567"));
        assert!(!is_valid_dispatch_phone("+1555"));
        assert!(!is_valid_dispatch_phone("+1555123456a"));
    }
}
