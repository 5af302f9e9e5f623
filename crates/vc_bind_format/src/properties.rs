use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use vc_bind::config::{ConfigAdapter, ConfigFormat};
use vc_bind::error::Error;
use vc_bind::tree::{Number, Value};

const FORMAT_NAME: &str = "properties";

// -----------------------------------------------------------------------------
// Escapes

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\x0C')
}

/// Resolves `\t \n \r \f \uXXXX`; any other escaped character stands for
/// itself and a lone trailing backslash is dropped.
fn unescape(text: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(text.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            flush_units(&mut units, &mut out);
            out.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        if escaped == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            let unit = (hex.len() == 4)
                .then(|| u16::from_str_radix(&hex, 16).ok())
                .flatten()
                .ok_or_else(|| Error::malformed(FORMAT_NAME, alloc::format!("malformed \\uxxxx escape `\\u{hex}`")))?;
            units.push(unit);
            continue;
        }
        flush_units(&mut units, &mut out);
        out.push(match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0C',
            other => other,
        });
    }
    flush_units(&mut units, &mut out);
    Ok(out)
}

/// Consecutive `\u` escapes may form a surrogate pair.
fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    if !units.is_empty() {
        out.extend(char::decode_utf16(units.drain(..)).map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER)));
    }
}

/// Escapes `text` so that it reads back unchanged. Keys also escape every
/// space; values only a leading one.
fn escape(text: &str, is_key: bool, out: &mut String) {
    for (index, ch) in text.chars().enumerate() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ' ' if index == 0 || is_key => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0C' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => {
                let mut buf = [0u16; 2];
                for unit in ch.encode_utf16(&mut buf) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Logical lines

enum Line {
    Blank,
    /// Text after the comment marker and one optional space.
    Comment(String),
    Entry(String),
}

/// Joins continued lines. A line continues when it ends with an odd
/// number of backslashes; leading blanks of the next line are dropped.
fn logical_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches(is_blank);
        let mut line = match pending.take() {
            Some(mut joined) => {
                joined.push_str(trimmed);
                joined
            }
            None => {
                if trimmed.is_empty() {
                    lines.push(Line::Blank);
                    continue;
                }
                if let Some(comment) = trimmed.strip_prefix(['#', '!']) {
                    let comment = comment.strip_prefix(' ').unwrap_or(comment);
                    lines.push(Line::Comment(comment.to_string()));
                    continue;
                }
                trimmed.to_string()
            }
        };

        let backslashes = line.chars().rev().take_while(|ch| *ch == '\\').count();
        if backslashes % 2 == 1 {
            line.pop();
            pending = Some(line);
        } else {
            lines.push(Line::Entry(line));
        }
    }
    if let Some(line) = pending {
        lines.push(Line::Entry(line));
    }
    lines
}

/// Splits at the first unescaped `=`, `:` or blank. A blank separator may
/// be followed by one `=` or `:`.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (index, ch) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '=' || ch == ':' || is_blank(ch) {
            key_end = index;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

// -----------------------------------------------------------------------------
// PropertiesDocument

/// One key of a [`PropertiesDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
    /// Comment lines above the key; `None` is an empty comment line.
    pub comments: Vec<Option<String>>,
}

/// A `.properties` file keeping the key order, the comments above each key
/// and a header comment block.
///
/// # Examples
///
/// ```
/// use vc_bind_format::{Properties, PropertiesDocument};
///
/// let text = "# Server\n\n# Port to bind\nport = 25565\nmotd: A \\\n    Minecraft Server\n";
/// let document = PropertiesDocument::parse(text).unwrap();
///
/// assert_eq!(document.header(), ["Server"]);
/// assert_eq!(document.get("port"), Some("25565"));
/// assert_eq!(document.get("motd"), Some("A Minecraft Server"));
/// assert_eq!(document.comments("port"), Some(&[Some("Port to bind".to_string())][..]));
///
/// let rendered = document.render(&Properties::new());
/// assert_eq!(rendered, "# Server\n\n# Port to bind\nport=25565\nmotd=A Minecraft Server\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesDocument {
    header: Vec<String>,
    entries: Vec<PropertyEntry>,
}

impl PropertiesDocument {
    #[inline]
    pub const fn new() -> Self {
        Self {
            header: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Parses `.properties` text.
    ///
    /// Comments directly above a key belong to it. Before the first key, the
    /// comments up to the last blank line form the header.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut document = Self::new();
        let mut comments: Vec<Option<String>> = Vec::new();
        let mut header_end: Option<usize> = None;

        for line in logical_lines(text) {
            match line {
                Line::Blank => {
                    if document.entries.is_empty() && !comments.is_empty() {
                        header_end = Some(comments.len());
                    }
                }
                Line::Comment(text) if text.is_empty() => comments.push(None),
                Line::Comment(text) => comments.push(Some(text)),
                Line::Entry(line) => {
                    if let Some(end) = header_end.take() {
                        document.header = comments
                            .drain(..end)
                            .map(Option::unwrap_or_default)
                            .collect();
                    }
                    let (key, value) = split_entry(&line);
                    let key = unescape(key)?;
                    let value = unescape(value)?;
                    document.insert(key.clone(), value);
                    document.set_comments(&key, core::mem::take(&mut comments));
                }
            }
        }
        Ok(document)
    }

    /// Renders the document with the style of `options`.
    pub fn render(&self, options: &Properties) -> String {
        let marker = if options.bang_comments { '!' } else { '#' };
        let separator = match (options.colon_separator, options.spaced_separator) {
            (false, false) => "=",
            (false, true) => " = ",
            (true, false) => ":",
            (true, true) => ": ",
        };

        let mut out = String::new();
        let comment = |out: &mut String, text: &str| {
            for part in text.split('\n') {
                out.push(marker);
                if !part.is_empty() {
                    out.push(' ');
                    out.push_str(part);
                }
                out.push('\n');
            }
        };

        if !self.header.is_empty() {
            for line in &self.header {
                comment(&mut out, line);
            }
            out.push('\n');
        }
        for entry in &self.entries {
            for line in &entry.comments {
                comment(&mut out, line.as_deref().unwrap_or_default());
            }
            escape(&entry.key, true, &mut out);
            out.push_str(separator);
            escape(&entry.value, false, &mut out);
            out.push('\n');
            if options.blank_lines {
                out.push('\n');
            }
        }
        out
    }

    #[inline]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    #[inline]
    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    #[inline]
    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .map(|index| self.entries[index].value.as_str())
    }

    /// Inserts or replaces a value, keeping the position and comments of an
    /// existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => self.entries[index].value = value,
            None => self.entries.push(PropertyEntry {
                key,
                value,
                comments: Vec::new(),
            }),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyEntry> {
        self.position(key).map(|index| self.entries.remove(index))
    }

    pub fn comments(&self, key: &str) -> Option<&[Option<String>]> {
        self.position(key)
            .map(|index| self.entries[index].comments.as_slice())
    }

    /// Returns `false` if the key is absent.
    pub fn set_comments(&mut self, key: &str, comments: Vec<Option<String>>) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries[index].comments = comments;
                true
            }
            None => false,
        }
    }
}

// -----------------------------------------------------------------------------
// PropertiesAdapter

/// A [`PropertiesDocument`] as a configuration document.
///
/// Values are stored as text, so getters parse numbers and booleans on
/// demand. Arrays and maps are refused with [`Error::UnsupportedShape`]
/// and a null value removes the key. Inline comments are not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesAdapter {
    document: PropertiesDocument,
}

impl PropertiesAdapter {
    #[inline]
    pub const fn new() -> Self {
        Self {
            document: PropertiesDocument::new(),
        }
    }
}

impl From<PropertiesDocument> for PropertiesAdapter {
    #[inline]
    fn from(document: PropertiesDocument) -> Self {
        Self { document }
    }
}

impl ConfigAdapter for PropertiesAdapter {
    type Document = PropertiesDocument;

    #[inline]
    fn document(&self) -> &PropertiesDocument {
        &self.document
    }

    #[inline]
    fn into_document(self) -> PropertiesDocument {
        self.document
    }

    #[inline]
    fn load(&mut self, document: PropertiesDocument) {
        self.document = document;
    }

    fn keys(&self) -> Vec<String> {
        self.document
            .entries()
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.document.position(key).is_some()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.document.get(key).map(Value::from)
    }

    fn get_number(&self, key: &str) -> Option<Number> {
        Number::parse(self.document.get(key)?).ok()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        let text = self.document.get(key)?.trim();
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        let text = match value {
            Value::Null => {
                self.document.remove(key);
                return Ok(());
            }
            Value::Number(number) => number.to_string(),
            Value::String(string) => string,
            Value::Bool(bool) => bool.to_string(),
            Value::Array(_) | Value::Map(_) => {
                return Err(Error::UnsupportedShape {
                    format: FORMAT_NAME,
                    shape: value.shape(),
                    key: key.to_string(),
                });
            }
        };
        self.document.insert(key, text);
        Ok(())
    }

    fn set_comments(&mut self, key: &str, lines: &[Option<String>]) {
        self.document.set_comments(key, lines.to_vec());
    }
}

// -----------------------------------------------------------------------------
// Properties

/// The `.properties` format with its rendering options.
///
/// All options are off by default, which renders `key=value` lines with `#`
/// comments.
///
/// # Examples
///
/// ```
/// use vc_bind::ConfigSerializer;
/// use vc_bind::derive::Config;
/// use vc_bind_format::Properties;
///
/// #[derive(Config, Default, Debug, PartialEq)]
/// #[config(default, key_format = "kebab")]
/// struct Server {
///     #[config(comment = "Shown in the server list")]
///     server_name: String,
///     max_players: u32,
///     online_mode: bool,
/// }
///
/// let format = Properties::new()
///     .with_header(["Minecraft server properties"])
///     .with_spaced_separator(true);
/// let serializer = ConfigSerializer::new(format);
/// let server = Server { server_name: "Lobby #1".into(), max_players: 20, online_mode: true };
///
/// let text = serializer.to_string(&server).unwrap();
/// assert_eq!(
///     text,
///     "# Minecraft server properties\n\n\
///      ## Shown in the server list\n\
///      server-name = Lobby \\#1\n\
///      max-players = 20\n\
///      online-mode = true\n"
/// );
/// assert_eq!(serializer.from_str::<Server>(&text).unwrap(), server);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Properties {
    header: Vec<String>,
    colon_separator: bool,
    bang_comments: bool,
    spaced_separator: bool,
    blank_lines: bool,
}

impl Properties {
    #[inline]
    pub const fn new() -> Self {
        Self {
            header: Vec::new(),
            colon_separator: false,
            bang_comments: false,
            spaced_separator: false,
            blank_lines: false,
        }
    }

    /// Comment lines at the top of new documents, followed by a blank line.
    pub fn with_header<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }

    /// `key:value` instead of `key=value`.
    #[inline]
    pub fn with_colon_separator(mut self, enabled: bool) -> Self {
        self.colon_separator = enabled;
        self
    }

    /// `!` instead of `#` as the comment marker.
    #[inline]
    pub fn with_bang_comments(mut self, enabled: bool) -> Self {
        self.bang_comments = enabled;
        self
    }

    /// A space on both sides of the separator.
    #[inline]
    pub fn with_spaced_separator(mut self, enabled: bool) -> Self {
        self.spaced_separator = enabled;
        self
    }

    /// An empty line after every entry.
    #[inline]
    pub fn with_blank_lines(mut self, enabled: bool) -> Self {
        self.blank_lines = enabled;
        self
    }
}

impl ConfigFormat for Properties {
    type Adapter = PropertiesAdapter;

    #[inline]
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn new_adapter(&self) -> PropertiesAdapter {
        let mut document = PropertiesDocument::new();
        document.set_header(self.header.clone());
        PropertiesAdapter::from(document)
    }

    fn parse(&self, text: &str) -> Result<PropertiesAdapter, Error> {
        PropertiesDocument::parse(text).map(PropertiesAdapter::from)
    }

    #[inline]
    fn render(&self, adapter: &PropertiesAdapter) -> Result<String, Error> {
        Ok(adapter.document.render(self))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Properties, PropertiesAdapter, PropertiesDocument, escape, unescape};
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use vc_bind::ConfigSerializer;
    use vc_bind::config::{ConfigAdapter, ConfigFormat};
    use vc_bind::derive::{Config, ConfigEnum};
    use vc_bind::error::{Error, ErrorType, RecordingHandler};
    use vc_bind::tree::{Map, Number, Value};

    #[test]
    fn separators() {
        let text = "a=1\nb:2\nc 3\nd = 4\ne : 5\nf    = 6\ng\nh=\ni=x=y\n";
        let document = PropertiesDocument::parse(text).unwrap();
        let pairs: Vec<(&str, &str)> = document
            .entries()
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
            .collect();
        assert!(
            pairs
                == [
                    ("a", "1"),
                    ("b", "2"),
                    ("c", "3"),
                    ("d", "4"),
                    ("e", "5"),
                    ("f", "6"),
                    ("g", ""),
                    ("h", ""),
                    ("i", "x=y"),
                ]
        );
    }

    #[test]
    fn comments_and_continuations() {
        let text = "! bang comment\n#\n# hash\nkey = first \\\n      second\\\\\n   \nnext=\\\n";
        let document = PropertiesDocument::parse(text).unwrap();
        assert!(document.header().is_empty());
        assert!(document.get("key") == Some("first second\\"));
        assert!(
            document.comments("key").unwrap()
                == [Some(String::from("bang comment")), None, Some(String::from("hash"))]
        );
        assert!(document.get("next") == Some(""));
    }

    #[test]
    fn escapes() {
        assert!(unescape(r"a\tb\nc\rd\fe").unwrap() == "a\tb\nc\rd\x0Ce");
        assert!(unescape(r"\u00e9\u00E9").unwrap() == "éé");
        assert!(unescape(r"\uD83D\uDE00").unwrap() == "😀");
        assert!(unescape(r"\=\:\ \q").unwrap() == "=: q");
        assert!(matches!(unescape(r"\u12"), Err(Error::Malformed { .. })));
        assert!(matches!(unescape(r"\uzzzz"), Err(Error::Malformed { .. })));

        let mut out = String::new();
        escape(" a b=c:d#e!f\\é😀", false, &mut out);
        assert!(out == r"\ a b\=c\:d\#e\!f\\\u00E9\uD83D\uDE00");
        let mut out = String::new();
        escape("my key", true, &mut out);
        assert!(out == r"my\ key");
    }

    #[test]
    fn escaped_text_reads_back() {
        let mut document = PropertiesDocument::new();
        document.insert("odd key:=", " leading\ttab\nnewline ünïcode");
        let text = document.render(&Properties::new());
        let back = PropertiesDocument::parse(&text).unwrap();
        assert!(back == document);
    }

    #[test]
    fn render_options() {
        let mut document = PropertiesDocument::new();
        document.set_header(vec!["Top".into(), String::new()]);
        document.insert("a", "1");
        document.insert("b", "2");
        document.set_comments("b", vec![Some("two\nlines".into()), None]);

        let format = Properties::new()
            .with_colon_separator(true)
            .with_bang_comments(true)
            .with_spaced_separator(true)
            .with_blank_lines(true);
        assert!(document.render(&format) == "! Top\n!\n\na: 1\n\n! two\n! lines\n!\nb: 2\n\n");
        assert!(document.render(&Properties::new()) == "# Top\n#\n\na=1\n# two\n# lines\n#\nb=2\n");
    }

    #[test]
    fn header_is_split_from_first_comments() {
        let text = "# Header\n#\n\n# Key comment\nkey=v\n";
        let document = PropertiesDocument::parse(text).unwrap();
        assert!(document.header() == ["Header", ""]);
        assert!(document.comments("key").unwrap() == [Some(String::from("Key comment"))]);
        assert!(document.render(&Properties::new()) == text);
    }

    #[test]
    fn adapter_shapes() {
        let mut adapter = PropertiesAdapter::new();
        adapter.set("n", Value::from(12)).unwrap();
        adapter.set("flag", Value::Bool(true)).unwrap();
        adapter.set("text", Value::from("hello")).unwrap();

        assert!(adapter.get("n") == Some(Value::from("12")));
        assert!(adapter.get_number("n") == Some(Number::from(12)));
        assert!(adapter.get_bool("flag") == Some(true));
        assert!(adapter.get_bool("text").is_none());

        let refused = adapter.set("list", Value::Array(vec![Value::from(1)]));
        assert!(matches!(refused, Err(Error::UnsupportedShape { shape: "array", .. })));
        let refused = adapter.set("map", Value::Map(Map::new()));
        assert!(matches!(refused, Err(Error::UnsupportedShape { shape: "map", .. })));

        adapter.set("n", Value::Null).unwrap();
        assert!(adapter.keys() == ["flag", "text"]);
    }

    #[derive(ConfigEnum, Debug, Clone, Copy, PartialEq)]
    enum Gamemode {
        Survival,
        Creative,
    }

    #[derive(Config, Debug, Clone, PartialEq, Default)]
    #[config(default)]
    struct Rcon {
        port: u16,
    }

    #[derive(Config, Debug, PartialEq)]
    #[config(record, default, key_format = "kebab")]
    struct ServerProperties {
        #[config(comment = "Default game mode")]
        gamemode: Gamemode,
        view_distance: u8,
        level_seed: Option<String>,
        spawn_protection: f32,
        #[config(hidden)]
        rcon: Option<Rcon>,
    }

    impl Default for ServerProperties {
        fn default() -> Self {
            Self {
                gamemode: Gamemode::Survival,
                view_distance: 10,
                level_seed: None,
                spawn_protection: 16.0,
                rcon: None,
            }
        }
    }

    #[test]
    fn flat_round_trip() {
        let serializer = ConfigSerializer::new(Properties::new());
        let value = ServerProperties {
            gamemode: Gamemode::Creative,
            view_distance: 12,
            level_seed: Some("-42".into()),
            spawn_protection: 2.5,
            rcon: None,
        };

        let text = serializer.to_string(&value).unwrap();
        assert!(
            text == "# Default game mode\ngamemode=creative\nview-distance=12\nlevel-seed=-42\nspawn-protection=2.5\n"
        );
        let back: ServerProperties = serializer.from_str(&text).unwrap();
        assert!(back == value);

        let partial: ServerProperties = serializer.from_str("gamemode=CREATIVE\n").unwrap();
        assert!(partial.gamemode == Gamemode::Creative);
        assert!(partial.view_distance == 10);
    }

    #[test]
    fn nested_values_are_refused() {
        let handler = Arc::new(RecordingHandler::new());
        let serializer = ConfigSerializer::builder(Properties::new())
            .shared_error_handler(handler.clone())
            .build();
        let value = ServerProperties {
            rcon: Some(Rcon { port: 25575 }),
            ..ServerProperties::default()
        };

        let adapter = serializer.serialize(&value).unwrap();
        assert!(!adapter.contains_key("rcon"));
        assert!(adapter.keys().len() == 3);
        assert!(handler.count(ErrorType::SerializerNotFound) == 1);
        assert!(handler.entries()[0].message.contains("rcon"));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("server.properties");
        let serializer = ConfigSerializer::new(Properties::new().with_header(["Generated"]));

        serializer.save(&path, &ServerProperties::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Generated\n\n"));

        let loaded: ServerProperties = serializer.load(&path).unwrap();
        assert!(loaded == ServerProperties::default());
        assert!(serializer.format().name() == "properties");
        assert!(Properties::new().parse("bad=\\u12").is_err());
    }
}
