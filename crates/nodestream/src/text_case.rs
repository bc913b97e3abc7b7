//! Naming conventions applied to payload names.

use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};

/// A naming convention codecs and transforms apply to names.
///
/// # Examples
///
/// ```
/// use nodestream::TextCase;
///
/// assert_eq!(TextCase::Snake.apply("firstName"), "first_name");
/// assert_eq!(TextCase::Camel.apply("HTTPServer"), "httpServer");
/// assert_eq!("kebab-case".parse::<TextCase>(), Ok(TextCase::Kebab));
/// ```
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextCase {
    /// Names pass through untouched.
    #[default]
    Unchanged,
    /// `firstName`
    Camel,
    /// `FirstName`
    Pascal,
    /// `first_name`
    Snake,
    /// `first-name`
    Kebab,
    /// `firstname`
    Lower,
    /// `FIRSTNAME`
    Upper,
}

impl TextCase {
    /// Rewrites `name` in this convention.
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            TextCase::Unchanged => name.into(),
            TextCase::Lower => name.to_lowercase(),
            TextCase::Upper => name.to_uppercase(),
            TextCase::Snake => join_words(name, "_"),
            TextCase::Kebab => join_words(name, "-"),
            TextCase::Camel | TextCase::Pascal => {
                let mut out = String::with_capacity(name.len());
                for (i, word) in split_words(name).iter().enumerate() {
                    let lower = word.to_lowercase();
                    if i == 0 && self == TextCase::Camel {
                        out.push_str(&lower);
                    } else {
                        let mut chars = lower.chars();
                        if let Some(first) = chars.next() {
                            out.extend(first.to_uppercase());
                            out.push_str(chars.as_str());
                        }
                    }
                }
                out
            }
        }
    }
}

fn join_words(name: &str, sep: &str) -> String {
    let words: Vec<String> = split_words(name).iter().map(|w| w.to_lowercase()).collect();
    words.join(sep)
}

/// Splits on separators, lower→upper transitions and the tail of acronyms
/// (`HTTPServer` → `HTTP`, `Server`). Digits stay with the preceding word.
fn split_words(name: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut start: Option<usize> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if let Some(s) = start.take() {
                words.push(&name[s..pos]);
            }
            continue;
        }
        let Some(s) = start else {
            start = Some(pos);
            continue;
        };
        let prev = chars[i - 1].1;
        let next = chars.get(i + 1).map(|&(_, n)| n);
        let boundary = c.is_uppercase()
            && (prev.is_lowercase()
                || prev.is_numeric()
                || (prev.is_uppercase() && next.is_some_and(char::is_lowercase)));
        if boundary {
            words.push(&name[s..pos]);
            start = Some(pos);
        }
    }
    if let Some(s) = start {
        words.push(&name[s..]);
    }
    words
}

impl fmt::Display for TextCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextCase::Unchanged => "unchanged",
            TextCase::Camel => "camelCase",
            TextCase::Pascal => "PascalCase",
            TextCase::Snake => "snake_case",
            TextCase::Kebab => "kebab-case",
            TextCase::Lower => "lowercase",
            TextCase::Upper => "UPPERCASE",
        })
    }
}

/// Returned when a string names no known [`TextCase`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown text case '{0}'")]
pub struct UnknownTextCase(pub String);

impl FromStr for TextCase {
    type Err = UnknownTextCase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        Ok(match key.as_str() {
            "" | "unchanged" | "none" | "default" => TextCase::Unchanged,
            "camel" | "camelcase" => TextCase::Camel,
            "pascal" | "pascalcase" => TextCase::Pascal,
            "snake" | "snakecase" => TextCase::Snake,
            "kebab" | "kebabcase" => TextCase::Kebab,
            "lower" | "lowercase" => TextCase::Lower,
            "upper" | "uppercase" => TextCase::Upper,
            _ => return Err(UnknownTextCase(s.into())),
        })
    }
}
