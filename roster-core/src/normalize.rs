//! Display-name normalization shared by the index build and query paths
//!
//! Both sides must agree on the normal form or precomputed keys in the
//! directory artifact would not match query-time keys.

/// Normalize a display name for similarity comparison.
///
/// Unicode-lowercases, collapses whitespace runs to single spaces, and trims.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut gap = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            gap = true;
        } else {
            if gap {
                out.push(' ');
                gap = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_name("  Arsenal FC "), "arsenal fc");
    }

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(normalize_name("Real\t Madrid   CF"), "real madrid cf");
    }

    #[test]
    fn handles_unicode_case_folding() {
        assert_eq!(normalize_name("Beşiktaş JK"), "beşiktaş jk");
        assert_eq!(normalize_name("BAYERN MÜNCHEN"), "bayern münchen");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   \t\n"), "");
    }
}
