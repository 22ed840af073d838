//! Block Segmenter: splits a normalized document into top-level blocks.
//!
//! Blocks are delimited by exactly one blank line (`"\n\n"`). Runs of three or more
//! newlines are not collapsed: the extra newlines stay inside the neighbouring block, so
//! intentional spacing is neither merged nor fragmented.
//!
//! Segmentation is lossless: `join_blocks(&segment(doc)) == doc` for every input.

/// Separator placed between two top-level blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Applies CRLF → LF normalization. Done once, at the input boundary.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Splits `document` into its ordered top-level blocks.
///
/// The empty document yields a single empty block, mirroring `str::split`, which keeps the
/// round-trip property true without a special case.
pub fn segment(document: &str) -> Vec<&str> {
    document.split(BLOCK_SEPARATOR).collect()
}

/// Re-joins a contiguous run of blocks with the block separator.
pub fn join_blocks(blocks: &[&str]) -> String {
    blocks.join(BLOCK_SEPARATOR)
}

/// True if the fragment contains nothing but whitespace.
pub fn is_blank(fragment: &str) -> bool {
    fragment.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_splits_on_blank_line() {
        assert_eq!(segment("A\n\nB\n\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_segment_keeps_single_newlines_inside_block() {
        let doc = "- one\n- two\n\nparagraph";
        assert_eq!(segment(doc), vec!["- one\n- two", "paragraph"]);
    }

    #[test]
    fn test_segment_does_not_collapse_long_newline_runs() {
        // "\n\n\n" = separator + one newline that belongs to the next block
        assert_eq!(segment("A\n\n\nB"), vec!["A", "\nB"]);
        assert_eq!(segment("A\n\n\n\nB"), vec!["A", "", "B"]);
    }

    #[test]
    fn test_segment_empty_document_is_single_empty_block() {
        assert_eq!(segment(""), vec![""]);
    }

    #[test]
    fn test_round_trip_reconstructs_document() {
        let docs = [
            "",
            "\n",
            "\n\n",
            "A",
            "A\n\nB",
            "\n\nleading separator",
            "trailing separator\n\n",
            "A\n\n\n\n\nB\n\n  \n\nC\n",
            "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n```\ncode\n\nstill code\n```",
        ];
        for doc in docs {
            assert_eq!(join_blocks(&segment(doc)), doc, "round trip failed for {doc:?}");
        }
    }

    #[test]
    fn test_normalize_line_endings_only_touches_crlf() {
        assert_eq!(normalize_line_endings("a\r\n\r\nb\rc"), "a\n\nb\rc");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t"));
        assert!(!is_blank(" x "));
    }
}
