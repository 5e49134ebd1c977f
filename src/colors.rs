//! Stripping of mIRC-style formatting and color control codes.
//!
//! Inbound lines may carry bold (`0x02`), underline (`0x1f`), reverse
//! (`0x16`), reset (`0x0f`), and color (`0x03`) control sequences. When
//! color stripping is enabled these are removed before the line reaches
//! the parser.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A color introducer takes an optional foreground of up to two digits
    // and an optional ",bg" pair.
    static ref FORMATTING: Regex =
        Regex::new("[\\x02\\x1f\\x16\\x0f]|\\x03[0-9]{0,2}(?:,[0-9]{0,2})?")
            .expect("formatting pattern compiles");
}

/// Extension methods for detecting and removing IRC formatting codes.
pub trait FormattedStringExt {
    /// Whether the string contains any formatting/color control codes.
    fn is_formatted(&self) -> bool;

    /// Returns the string with all formatting/color control codes removed.
    fn strip_formatting(&self) -> Cow<'_, str>;
}

impl FormattedStringExt for str {
    fn is_formatted(&self) -> bool {
        FORMATTING.is_match(self)
    }

    fn strip_formatting(&self) -> Cow<'_, str> {
        FORMATTING.replace_all(self, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert!(!"hello world".is_formatted());
        assert!(matches!("hello world".strip_formatting(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_bold_and_underline() {
        assert_eq!("\u{2}bold\u{2} \u{1f}under\u{1f}".strip_formatting(), "bold under");
    }

    #[test]
    fn test_strip_reset_and_reverse() {
        assert_eq!("\u{16}rev\u{f}".strip_formatting(), "rev");
    }

    #[test]
    fn test_strip_color_with_fg_bg() {
        assert_eq!("\u{3}04,12warning\u{3}".strip_formatting(), "warning");
    }

    #[test]
    fn test_strip_color_single_digit() {
        assert_eq!("\u{3}4red".strip_formatting(), "red");
    }

    #[test]
    fn test_strip_bare_color_introducer() {
        assert_eq!("\u{3}plain".strip_formatting(), "plain");
    }

    #[test]
    fn test_colored_nick_prefix() {
        let line = ":\u{3}04alice\u{3}!user@host PRIVMSG #chan :\u{2}hi\u{2}";
        assert_eq!(
            line.strip_formatting(),
            ":alice!user@host PRIVMSG #chan :hi"
        );
    }
}
