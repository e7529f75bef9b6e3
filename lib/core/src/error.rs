//! Error handling foundation for the seminar-pulse platform.
//!
//! Each crate defines its own error enum; fallible operations return it
//! wrapped in a rootcause [`Report`] through this alias.

use rootcause::Report;

/// Result carrying a rootcause report of context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_carries_value() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.expect("should be ok"), 7);
    }
}
