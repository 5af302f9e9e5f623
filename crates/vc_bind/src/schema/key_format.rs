use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

// -----------------------------------------------------------------------------
// KeyFormatter

/// Turns a member name into the key written to the primitive tree.
///
/// Any `Fn(&str) -> String` closure is a formatter.
pub trait KeyFormatter: Send + Sync {
    fn format(&self, key: &str) -> String;
}

impl<F> KeyFormatter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    #[inline]
    fn format(&self, key: &str) -> String {
        self(key)
    }
}

// -----------------------------------------------------------------------------
// KeyCase

/// The built-in key formatting strategies.
///
/// Words are split at `_`, `-` and spaces, and where a lower case letter is
/// followed by an upper case one.
///
/// # Examples
///
/// ```
/// use vc_bind::schema::{KeyCase, KeyFormatter};
///
/// assert_eq!(KeyCase::Kebab.format("max_players"), "max-players");
/// assert_eq!(KeyCase::Camel.format("max_players"), "maxPlayers");
/// assert_eq!(KeyCase::UpperSnake.format("maxPlayers"), "MAX_PLAYERS");
/// assert_eq!(KeyCase::Proper.format("max_players"), "Max players");
/// assert_eq!(KeyCase::Identity.format("max_players"), "max_players");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyCase {
    /// Unchanged.
    #[default]
    Identity,
    /// `max_players`
    Snake,
    /// `MAX_PLAYERS`
    UpperSnake,
    /// `max-players`
    Kebab,
    /// `MAX-PLAYERS`
    UpperKebab,
    /// `maxPlayers`
    Camel,
    /// `MaxPlayers`
    Pascal,
    /// `Max players`
    Proper,
    /// `MAX PLAYERS`
    Upper,
}

impl KeyCase {
    pub const ALL: [KeyCase; 9] = [
        Self::Identity,
        Self::Snake,
        Self::UpperSnake,
        Self::Kebab,
        Self::UpperKebab,
        Self::Camel,
        Self::Pascal,
        Self::Proper,
        Self::Upper,
    ];

    /// The name accepted by `#[config(key_format = "...")]` and [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Snake => "snake",
            Self::UpperSnake => "upper_snake",
            Self::Kebab => "kebab",
            Self::UpperKebab => "upper_kebab",
            Self::Camel => "camel",
            Self::Pascal => "pascal",
            Self::Proper => "proper",
            Self::Upper => "upper",
        }
    }
}

impl KeyFormatter for KeyCase {
    fn format(&self, key: &str) -> String {
        if *self == Self::Identity {
            return String::from(key);
        }
        let words = split_words(key);
        let mut out = String::with_capacity(key.len() + words.len());
        for (index, word) in words.iter().enumerate() {
            let separator = match self {
                Self::Snake | Self::UpperSnake => "_",
                Self::Kebab | Self::UpperKebab => "-",
                Self::Proper | Self::Upper => " ",
                _ => "",
            };
            if index > 0 {
                out.push_str(separator);
            }
            match self {
                Self::Snake | Self::Kebab => out.push_str(&word.to_lowercase()),
                Self::UpperSnake | Self::UpperKebab | Self::Upper => out.push_str(&word.to_uppercase()),
                Self::Camel if index == 0 => out.push_str(&word.to_lowercase()),
                Self::Proper if index > 0 => out.push_str(&word.to_lowercase()),
                _ => push_capitalized(&mut out, word),
            }
        }
        out
    }
}

impl fmt::Display for KeyCase {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown [`KeyCase`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key format `{0}`")]
pub struct ParseKeyCaseError(pub String);

impl FromStr for KeyCase {
    type Err = ParseKeyCaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|case| case.as_str() == s)
            .ok_or_else(|| ParseKeyCaseError(String::from(s)))
    }
}

fn split_words(key: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (index, ch) in key.char_indices() {
        if matches!(ch, '_' | '-' | ' ') {
            if start < index {
                words.push(&key[start..index]);
            }
            start = index + ch.len_utf8();
        } else if ch.is_uppercase() && prev.is_some_and(char::is_lowercase) {
            words.push(&key[start..index]);
            start = index;
        }
        prev = Some(ch);
    }
    if start < key.len() {
        words.push(&key[start..]);
    }
    words
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{KeyCase, KeyFormatter, split_words};
    use alloc::string::String;

    #[test]
    fn splits_mixed_input() {
        assert!(split_words("maxPlayers") == ["max", "Players"]);
        assert!(split_words("__a--b  c") == ["a", "b", "c"]);
        assert!(split_words("HTTPServer") == ["HTTPServer"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn every_case() {
        let key = "server_portNumber";
        let formatted: alloc::vec::Vec<String> = KeyCase::ALL.iter().map(|case| case.format(key)).collect();
        assert!(
            formatted
                == [
                    "server_portNumber",
                    "server_port_number",
                    "SERVER_PORT_NUMBER",
                    "server-port-number",
                    "SERVER-PORT-NUMBER",
                    "serverPortNumber",
                    "ServerPortNumber",
                    "Server port number",
                    "SERVER PORT NUMBER",
                ]
        );
    }

    #[test]
    fn parse_names() {
        for case in KeyCase::ALL {
            assert!(case.as_str().parse::<KeyCase>() == Ok(case));
        }
        assert!("shouting".parse::<KeyCase>().is_err());
    }

    #[test]
    fn closures_are_formatters() {
        let prefixed = |key: &str| alloc::format!("app.{key}");
        assert!(prefixed.format("port") == "app.port");
    }
}
