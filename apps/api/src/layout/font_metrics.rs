//! Static font-metric tables for the preview typefaces.
//!
//! Character widths are in em units (relative to font size). This is an intentional
//! approximation of real glyph advances: it is deterministic, needs no font files, and is
//! close enough that the measurement safe offset absorbs the residual error.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters), index = (char as usize) - 32.
//! East Asian wide characters measure a full em; everything else falls back to the
//! table's average width.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// The typefaces used by the preview stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Body text, headings, lists, tables.
    Sans,
    /// Code blocks.
    Mono,
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [f32; 95],
    /// Fallback width for non-ASCII, non-wide characters.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a single character in em units.
    pub fn char_em(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if c == '\t' {
            self.space_width * 4.0
        } else if is_wide(c) {
            1.0
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_em(c)).sum()
    }

    /// Measures the rendered width of a string in pixels at `size_px`.
    pub fn measure_px(&self, s: &str, size_px: f32) -> f32 {
        self.measure_em(s) * size_px
    }

    /// Greedy word wrap at `max_width_px`, returning the text of each printed line.
    ///
    /// Words wider than a whole line are broken between characters, which also covers
    /// scripts written without spaces. Whitespace-only input produces no lines.
    pub fn wrap(&self, text: &str, size_px: f32, max_width_px: f32) -> Vec<String> {
        let max_em = if size_px > 0.0 { max_width_px / size_px } else { 0.0 };
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_em = 0.0_f32;

        for word in text.split_whitespace() {
            let word_em = self.measure_em(word);
            let space_em = if current.is_empty() { 0.0 } else { self.space_width };

            if current_em + space_em + word_em <= max_em {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_em += space_em + word_em;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_em = 0.0;
            }

            if word_em <= max_em {
                current.push_str(word);
                current_em = word_em;
                continue;
            }

            // Word alone overflows the line: break it between characters.
            for c in word.chars() {
                let c_em = self.char_em(c);
                if !current.is_empty() && current_em + c_em > max_em {
                    lines.push(std::mem::take(&mut current));
                    current_em = 0.0;
                }
                current.push(c);
                current_em += c_em;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// East Asian wide and fullwidth ranges (Hangul, CJK, kana, fullwidth forms).
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Humanist sans-serif body face.
static SANS_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Sans,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
    space_width: 0.25,
};

/// Monospace face: every ASCII glyph advances 0.6em.
static MONO_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Mono,
    widths: [0.60; 95],
    average_char_width: 0.60,
    space_width: 0.60,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Sans => &SANS_TABLE,
        FontFamily::Mono => &MONO_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_em_empty_returns_zero() {
        assert_eq!(get_metrics(FontFamily::Sans).measure_em(""), 0.0);
    }

    #[test]
    fn test_measure_em_ascii_characters() {
        let metrics = get_metrics(FontFamily::Sans);
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00
        let width = metrics.measure_em("Rust");
        assert!((width - 2.00).abs() < 1e-3, "Rust width should be ~2.00, got {width}");
    }

    #[test]
    fn test_wide_characters_take_a_full_em() {
        let metrics = get_metrics(FontFamily::Sans);
        assert_eq!(metrics.measure_em("한글"), 2.0);
        assert!((metrics.measure_em("é") - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_mono_is_uniform() {
        let metrics = get_metrics(FontFamily::Mono);
        assert!((metrics.measure_px("iiii", 10.0) - metrics.measure_px("WWWW", 10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = get_metrics(FontFamily::Sans).wrap("hello world", 16.0, 600.0);
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let metrics = get_metrics(FontFamily::Sans);
        let text = "word ".repeat(40);
        let lines = metrics.wrap(&text, 16.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.measure_px(line, 16.0) <= 200.0 + 1e-3, "line too wide: {line}");
        }
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn test_wrap_breaks_overlong_word_between_characters() {
        let metrics = get_metrics(FontFamily::Mono);
        // 0.6em × 10px = 6px per char, 31px line → 5 chars per line
        let lines = metrics.wrap("abcdefghijkl", 10.0, 31.0);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_wrap_blank_input_has_no_lines() {
        assert!(get_metrics(FontFamily::Sans).wrap("  \n ", 16.0, 100.0).is_empty());
    }
}
