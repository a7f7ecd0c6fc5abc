//! Normalization helpers for noisy VLM text
//!
//! The oracle transcribes the dialogue box with embedded line breaks,
//! sometimes in the middle of a word. Pattern matching runs on a
//! whitespace-collapsed form of the text.

/// Collapse line breaks and whitespace runs into single spaces
pub fn normalize_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive containment check
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_newlines() {
        assert_eq!(
            normalize_lines("LASS TIANA sent\nout SHROOMISH!"),
            "LASS TIANA sent out SHROOMISH!"
        );
    }

    #[test]
    fn test_normalize_collapses_runs_and_trims() {
        assert_eq!(normalize_lines("  Wild   ZIGZAGOON\r\nappeared!  "), "Wild ZIGZAGOON appeared!");
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Wild POOCHYENA appeared!", "wild "));
        assert!(contains_ci("THERE'S NO RUNNING FROM A TRAINER BATTLE!", "no running from"));
        assert!(!contains_ci("Go! TREECKO!", "wild "));
    }
}
