//! The C entry point.
//!
//! Links as `TSLanguage *tree_sitter_hare(void);`, declared in
//! `include/tree_sitter_hare.h`. The returned pointer is an opaque handle to
//! the shared [`Language`]: C callers must not dereference, modify or free it.

use crate::language::{language, Language};

/// Returns the shared Hare descriptor. Never null; the same address on every
/// call and from every thread.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tree_sitter_hare() -> *const Language {
    std::ptr::from_ref(language())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_matches_rust_accessor() {
        let pointer = tree_sitter_hare();
        assert!(!pointer.is_null());
        assert!(std::ptr::eq(pointer, language()));
        assert_eq!(pointer, tree_sitter_hare());
    }
}
