//! Input length checks

/// Whether `s` has between `min` and `max` characters (inclusive)
///
/// Counts Unicode scalar values, not bytes.
pub fn has_len(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    len >= min && len <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_inclusive() {
        assert!(!has_len("ab", 3, 5));
        assert!(has_len("abc", 3, 5));
        assert!(has_len("abcde", 3, 5));
        assert!(!has_len("abcdef", 3, 5));
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 3 chars, 9 bytes
        assert!(has_len("日本語", 3, 3));
    }
}
