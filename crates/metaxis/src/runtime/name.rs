//! Class name validation.
//!
//! A class name is a non-empty run of ASCII letters, digits and the four
//! separators `.`, `:`, `-` and `_`, e.g. `meta.Object` or `ui::Button-2`.

/// Returns true if `name` may be used as a registered class name.
///
/// # Example
///
/// ```rust
/// use metaxis::runtime::is_valid_name;
///
/// assert!(is_valid_name("meta.Object"));
/// assert!(is_valid_name("meta:Object"));
/// assert!(!is_valid_name("meta Object"));
/// assert!(!is_valid_name(""));
/// ```
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

const fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b':' | b'-' | b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_are_accepted() {
        for name in ["meta.Object", "meta:Object", "meta-Object", "meta_Object"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_other_punctuation_is_rejected() {
        for c in "~`!@#$%^&*()+={[}]|\\;\"'<,>?/ \t\n".chars() {
            let name = format!("meta{c}Object");
            assert!(!is_valid_name(&name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_empty_and_non_ascii() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("métaObject"));
        assert!(!is_valid_name("方法"));
    }

    #[test]
    fn test_digits_and_separators_only() {
        assert!(is_valid_name("0"));
        assert!(is_valid_name("::"));
        assert!(is_valid_name("a.b:c-d_e9"));
    }
}
