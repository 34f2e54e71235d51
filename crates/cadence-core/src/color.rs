//! Display colors for areas, tags and topics.
//!
//! Colors are free-form strings coming from a color picker or from older
//! databases, so parsing is lenient: anything that is not a recognised hex or
//! `rgb(a)(...)` value is treated as "no color" instead of raising.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A validated color string, either `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`,
/// or `rgb(...)` / `rgba(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

/// Returned by [`Color::from_str`] for strings that are not a color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a color: {0:?}")]
pub struct InvalidColor(pub String);

impl Color {
  /// Parse an optional raw value, mapping blank or malformed input to `None`.
  pub fn lenient(raw: Option<&str>) -> Option<Self> {
    raw.and_then(|s| s.parse().ok())
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for Color {
  type Err = InvalidColor;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if is_hex(trimmed) || is_rgb_function(trimmed) {
      Ok(Self(trimmed.to_owned()))
    } else {
      Err(InvalidColor(s.to_owned()))
    }
  }
}

impl TryFrom<String> for Color {
  type Error = InvalidColor;

  fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Color> for String {
  fn from(c: Color) -> Self { c.0 }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

fn is_hex(s: &str) -> bool {
  let Some(digits) = s.strip_prefix('#') else {
    return false;
  };
  matches!(digits.len(), 3 | 4 | 6 | 8)
    && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_rgb_function(s: &str) -> bool {
  let inner = s
    .strip_prefix("rgba(")
    .or_else(|| s.strip_prefix("rgb("))
    .and_then(|rest| rest.strip_suffix(')'));
  match inner {
    Some(args) => {
      !args.trim().is_empty()
        && args
          .chars()
          .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == ',' || c == '.')
    }
    None => false,
  }
}

/// Resolve the color a topic (or one of its revisions) is displayed with.
///
/// The area's color wins whenever it is set; otherwise the topic's own color
/// is used. Evaluated on every read, never cached.
pub fn effective_color(
  area_color: Option<&Color>,
  topic_color: Option<&Color>,
) -> Option<Color> {
  area_color.or(topic_color).cloned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_hex_forms() {
    for raw in ["#f00", "#f00a", "#FF0000", "#ff0000cc"] {
      assert!(raw.parse::<Color>().is_ok(), "{raw} should parse");
    }
  }

  #[test]
  fn accepts_rgba_functions() {
    assert!("rgba(53, 132, 228, 0.5)".parse::<Color>().is_ok());
    assert!("rgb(1,2,3)".parse::<Color>().is_ok());
  }

  #[test]
  fn rejects_garbage() {
    for raw in ["", "red", "#12", "#GGGGGG", "rgba()", "rgba(1;2;3)", "#12345"] {
      assert!(raw.parse::<Color>().is_err(), "{raw} should be rejected");
    }
  }

  #[test]
  fn lenient_maps_invalid_to_none() {
    assert_eq!(Color::lenient(Some("not a color")), None);
    assert_eq!(Color::lenient(None), None);
    assert_eq!(
      Color::lenient(Some(" #0000FF ")).map(|c| c.to_string()),
      Some("#0000FF".to_owned())
    );
  }

  #[test]
  fn area_color_overrides_topic_color() {
    let red: Color = "#FF0000".parse().unwrap();
    let blue: Color = "#0000FF".parse().unwrap();
    assert_eq!(effective_color(Some(&red), Some(&blue)), Some(red.clone()));
    assert_eq!(effective_color(None, Some(&blue)), Some(blue));
    assert_eq!(effective_color(None, None), None);
  }

  #[test]
  fn serde_rejects_invalid_colors() {
    let ok: Color = serde_json::from_str("\"#abc\"").unwrap();
    assert_eq!(ok.as_str(), "#abc");
    assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
  }
}
