//! Shared helpers.

pub mod fs;
pub mod path;

/// `"1 asset"`, `"0 files"`, `"3 files"`.
pub fn plural_count(count: usize, noun: &str) -> String {
    match count {
        1 => format!("1 {noun}"),
        n => format!("{n} {noun}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "file"), "0 files");
        assert_eq!(plural_count(1, "asset"), "1 asset");
        assert_eq!(plural_count(12, "hit"), "12 hits");
    }
}
