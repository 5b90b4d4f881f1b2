//! JSON and JavaScript literal formatting.
//!
//! The data blocks embedded in generated scripts (`toggleableGroups`,
//! `layerLegends`, `layerAbstracts`, `titleData`) are written the way
//! Python's `json.dumps` writes them: `", "` between items, `": "` between
//! key and value, and every non-ASCII character escaped as `\uXXXX`. Keeping
//! that exact shape lets previously exported maps be diffed against new
//! output line by line.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// `serde_json` formatter reproducing `json.dumps` defaults.
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() && c != '\x7f' {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize a value as `json.dumps` would.
pub fn to_json<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, SpacedAsciiFormatter);
    value.serialize(&mut ser)?;
    // Only ASCII is ever written.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Format a number the way the reference exporter printed floats:
/// integral values keep one decimal (`1.0`), others use the shortest
/// round-trip form (`0.8`).
pub fn js_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Escape text for a single-quoted JavaScript string literal inside an
/// inline `<script>` block.
pub fn escape_single_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            '/' if escaped.ends_with('<') && closes_script(&text[i + 1..]) => {
                escaped.push_str("\\/")
            }
            c => escaped.push(c),
        }
    }
    escaped
}

fn closes_script(rest: &str) -> bool {
    rest.get(..6)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("script"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn spaced_separators() {
        let mut map = IndexMap::new();
        map.insert("b", vec!["x", "y"]);
        map.insert("a", vec![]);
        assert_eq!(to_json(&map).unwrap(), r#"{"b": ["x", "y"], "a": []}"#);
    }

    #[test]
    fn empty_map() {
        let map: IndexMap<String, String> = IndexMap::new();
        assert_eq!(to_json(&map).unwrap(), "{}");
    }

    #[test]
    fn non_ascii_escaped() {
        assert_eq!(to_json("Forêt").unwrap(), r#""For\u00eat""#);
    }

    #[test]
    fn astral_chars_use_surrogate_pairs() {
        assert_eq!(to_json("\u{1f5fa}").unwrap(), r#""\ud83d\uddfa""#);
    }

    #[test]
    fn control_chars_escaped() {
        assert_eq!(to_json("a\nb\"c").unwrap(), r#""a\nb\"c""#);
    }

    #[test]
    fn numbers_like_reference_output() {
        assert_eq!(js_number(1.0), "1.0");
        assert_eq!(js_number(0.8), "0.8");
        assert_eq!(js_number(0.0), "0.0");
        assert_eq!(js_number(0.35), "0.35");
    }

    #[test]
    fn single_quote_escaping() {
        assert_eq!(escape_single_quoted("O'Brien"), "O\\'Brien");
        assert_eq!(escape_single_quoted("a\\b"), "a\\\\b");
    }

    #[test]
    fn line_breaks_escaped() {
        assert_eq!(escape_single_quoted("two\nlines\r"), "two\\nlines\\r");
        assert_eq!(escape_single_quoted("a\u{2028}b"), "a\\u2028b");
        assert!(!escape_single_quoted("x\ny").contains('\n'));
    }

    #[test]
    fn closing_tag_cannot_end_script() {
        assert_eq!(escape_single_quoted("</script>"), "<\\/script>");
        assert_eq!(escape_single_quoted("</SCRIPT>"), "<\\/SCRIPT>");
        assert_eq!(escape_single_quoted("<a>x</a>"), "<a>x</a>");
        assert_eq!(escape_single_quoted("a/b"), "a/b");
    }
}
