use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use serde_yaml::{Mapping, Number as YamlNumber, Value as YamlValue};
use vc_bind::config::{ConfigAdapter, ConfigFormat, MemoryConfigAdapter};
use vc_bind::error::Error;
use vc_bind::tree::{Map, MapEntry, Number, Value};

const FORMAT_NAME: &str = "YAML";

// -----------------------------------------------------------------------------
// Conversion

fn number_from_yaml(number: &YamlNumber) -> Value {
    if let Some(int) = number.as_i64() {
        Value::from(int)
    } else if let Some(int) = number.as_u64() {
        Value::from(int)
    } else {
        number
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

/// Scalar keys become their text; other keys are dropped.
fn key_from_yaml(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(string) => Some(string.clone()),
        YamlValue::Number(number) => Some(number.to_string()),
        YamlValue::Bool(bool) => Some(bool.to_string()),
        YamlValue::Tagged(tagged) => key_from_yaml(&tagged.value),
        _ => {
            log::debug!("dropping a YAML key that is not a scalar");
            None
        }
    }
}

fn map_from_yaml(mapping: &Mapping) -> Map {
    mapping
        .iter()
        .filter_map(|(key, value)| Some((key_from_yaml(key)?, from_yaml(value))))
        .collect()
}

fn from_yaml(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(bool) => Value::Bool(*bool),
        YamlValue::Number(number) => number_from_yaml(number),
        YamlValue::String(string) => Value::String(string.clone()),
        YamlValue::Sequence(sequence) => Value::Array(sequence.iter().map(from_yaml).collect()),
        YamlValue::Mapping(mapping) => Value::Map(map_from_yaml(mapping)),
        YamlValue::Tagged(tagged) => from_yaml(&tagged.value),
    }
}

fn number_to_yaml(number: &Number) -> YamlValue {
    if let Number::Integer(int) = number {
        if let Ok(int) = i64::try_from(int) {
            return YamlValue::Number(int.into());
        }
        if let Ok(int) = u64::try_from(int) {
            return YamlValue::Number(int.into());
        }
    }
    YamlValue::Number(number.clamped().to_f64().into())
}

fn to_yaml(value: &Value) -> YamlValue {
    match value {
        Value::Null => YamlValue::Null,
        Value::Bool(bool) => YamlValue::Bool(*bool),
        Value::Number(number) => number_to_yaml(number),
        Value::String(string) => YamlValue::String(string.clone()),
        Value::Array(array) => YamlValue::Sequence(array.iter().map(to_yaml).collect()),
        Value::Map(map) => YamlValue::Mapping(
            map.iter()
                .map(|(key, value)| (YamlValue::String(key.to_string()), to_yaml(value)))
                .collect(),
        ),
    }
}

// -----------------------------------------------------------------------------
// Emitter

/// Renders `value` with serde_yaml, without the trailing newline.
fn render_node(value: &YamlValue) -> Result<String, Error> {
    let mut text = serde_yaml::to_string(value).map_err(|err| Error::malformed(FORMAT_NAME, err))?;
    let trimmed = text.trim_end_matches('\n').len();
    text.truncate(trimmed);
    Ok(text)
}

/// Block mappings with comments. Scalars and sequences come from serde_yaml.
struct Emitter {
    out: String,
    indent: usize,
}

impl Emitter {
    fn pad(&mut self, depth: usize) {
        self.out.extend(core::iter::repeat_n(' ', depth * self.indent));
    }

    fn comment_lines(&mut self, depth: usize, lines: &[Option<String>]) {
        for line in lines {
            match line {
                None => self.out.push('\n'),
                Some(text) => {
                    for part in text.split('\n') {
                        self.pad(depth);
                        self.out.push('#');
                        if !part.is_empty() {
                            self.out.push(' ');
                            self.out.push_str(part);
                        }
                        self.out.push('\n');
                    }
                }
            }
        }
    }

    fn inline_comment(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment {
            // A newline would end the comment early.
            let _ = write!(self.out, " # {}", comment.replace('\n', " "));
        }
    }

    fn map(&mut self, depth: usize, map: &Map) -> Result<(), Error> {
        for entry in map.entries() {
            self.entry(depth, entry)?;
        }
        Ok(())
    }

    fn entry(&mut self, depth: usize, entry: &MapEntry) -> Result<(), Error> {
        self.comment_lines(depth, &entry.comments.lines);
        self.pad(depth);
        self.out.push_str(&render_node(&YamlValue::String(entry.key.clone()))?);
        self.out.push(':');

        match &entry.value {
            Value::Map(map) if !map.is_empty() => {
                self.inline_comment(entry.comments.inline.as_deref());
                self.out.push('\n');
                self.map(depth + 1, map)
            }
            Value::Array(array) if !array.is_empty() => {
                self.inline_comment(entry.comments.inline.as_deref());
                self.out.push('\n');
                let rendered = render_node(&to_yaml(&entry.value))?;
                for line in rendered.lines() {
                    self.pad(depth + 1);
                    self.out.push_str(line);
                    self.out.push('\n');
                }
                Ok(())
            }
            value => {
                let rendered = render_node(&to_yaml(value))?;
                let mut lines = rendered.lines();
                self.out.push(' ');
                self.out.push_str(lines.next().unwrap_or_default());
                // Block scalars continue below, indented past the key.
                let block: Vec<&str> = lines.collect();
                if block.is_empty() {
                    self.inline_comment(entry.comments.inline.as_deref());
                }
                self.out.push('\n');
                for line in block {
                    self.pad(depth);
                    self.out.push_str(line);
                    self.out.push('\n');
                }
                Ok(())
            }
        }
    }
}

// -----------------------------------------------------------------------------
// YamlAdapter

/// A YAML mapping as a configuration document.
///
/// Every shape is stored, together with the comments of each key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YamlAdapter {
    inner: MemoryConfigAdapter,
}

impl YamlAdapter {
    #[inline]
    pub const fn new() -> Self {
        Self {
            inner: MemoryConfigAdapter::new(),
        }
    }
}

impl ConfigAdapter for YamlAdapter {
    type Document = Map;

    #[inline]
    fn document(&self) -> &Map {
        self.inner.document()
    }

    #[inline]
    fn into_document(self) -> Map {
        self.inner.into_document()
    }

    #[inline]
    fn load(&mut self, document: Map) {
        self.inner.load(document);
    }

    #[inline]
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    #[inline]
    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.inner.set(key, value)
    }

    #[inline]
    fn set_comments(&mut self, key: &str, lines: &[Option<String>]) {
        self.inner.set_comments(key, lines);
    }

    #[inline]
    fn set_inline_comment(&mut self, key: &str, comment: Option<&str>) {
        self.inner.set_inline_comment(key, comment);
    }

    #[inline]
    fn to_map(&self) -> Map {
        self.inner.to_map()
    }
}

// -----------------------------------------------------------------------------
// Yaml

/// The YAML format.
///
/// Parsing goes through `serde_yaml`, which discards comments. Rendering
/// writes block mappings with the comment lines above each key and the
/// inline comment after its value.
///
/// # Examples
///
/// ```
/// use vc_bind::ConfigSerializer;
/// use vc_bind::derive::Config;
/// use vc_bind_format::Yaml;
///
/// #[derive(Config, Default, Debug, PartialEq)]
/// #[config(default, key_format = "kebab")]
/// struct Spawn {
///     #[config(comment = "Blocks from the origin.")]
///     safe_radius: u32,
///     #[config(inline_comment = "ticks")]
///     protection: u32,
/// }
///
/// let serializer = ConfigSerializer::new(Yaml::new());
/// let spawn = Spawn { safe_radius: 16, protection: 100 };
///
/// let text = serializer.to_string(&spawn).unwrap();
/// assert_eq!(text, "# Blocks from the origin.\nsafe-radius: 16\nprotection: 100 # ticks\n");
/// assert_eq!(serializer.from_str::<Spawn>(&text).unwrap(), spawn);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Yaml {
    indent: usize,
}

impl Yaml {
    /// Indents nested mappings by two spaces.
    #[inline]
    pub const fn new() -> Self {
        Self { indent: 2 }
    }

    /// Spaces per nesting level, at least one.
    #[inline]
    pub const fn with_indent(mut self, indent: usize) -> Self {
        self.indent = if indent == 0 { 1 } else { indent };
        self
    }
}

impl Default for Yaml {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFormat for Yaml {
    type Adapter = YamlAdapter;

    #[inline]
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    #[inline]
    fn new_adapter(&self) -> YamlAdapter {
        YamlAdapter::new()
    }

    /// An empty document is an empty mapping.
    fn parse(&self, text: &str) -> Result<YamlAdapter, Error> {
        if text.trim().is_empty() {
            return Ok(YamlAdapter::new());
        }
        let root: YamlValue = serde_yaml::from_str(text).map_err(|err| Error::malformed(FORMAT_NAME, err))?;
        let map = match root {
            YamlValue::Null => Map::new(),
            YamlValue::Mapping(mapping) => map_from_yaml(&mapping),
            other => {
                return Err(Error::malformed(
                    FORMAT_NAME,
                    alloc::format!("expected a mapping at the root, found {}", from_yaml(&other).shape()),
                ));
            }
        };
        let mut adapter = YamlAdapter::new();
        adapter.load(map);
        Ok(adapter)
    }

    fn render(&self, adapter: &YamlAdapter) -> Result<String, Error> {
        let mut emitter = Emitter {
            out: String::new(),
            indent: self.indent,
        };
        emitter.map(0, adapter.document())?;
        Ok(emitter.out)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Yaml, YamlAdapter};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use vc_bind::ConfigSerializer;
    use vc_bind::config::{ConfigAdapter, ConfigFormat};
    use vc_bind::derive::{Config, ConfigEnum};
    use vc_bind::tree::{Map, Number, Value};

    #[derive(ConfigEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Rank {
        Guest,
        Admin,
    }

    #[derive(Config, Debug, Clone, PartialEq, Default)]
    #[config(default)]
    struct Limits {
        #[config(comment = "Per player")]
        chunks: u16,
        entities: u32,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default, key_format = "kebab")]
    struct World {
        #[config(comment = "World name", comment = "")]
        level_name: String,
        #[config(inline_comment = "in blocks")]
        border: f64,
        limits: Limits,
        ranks: BTreeMap<String, Rank>,
        whitelist: Vec<String>,
        motd: String,
    }

    fn world() -> World {
        World {
            level_name: "overworld".into(),
            border: 2500.5,
            limits: Limits { chunks: 64, entities: 800 },
            ranks: [(String::from("steve"), Rank::Admin)].into_iter().collect(),
            whitelist: vec!["steve".into(), "alex".into()],
            motd: "line one\nline two".into(),
        }
    }

    #[test]
    fn renders_comments_and_nesting() {
        let serializer = ConfigSerializer::new(Yaml::new());
        let text = serializer.to_string(&world()).unwrap();

        assert!(text.starts_with("# World name\n\nlevel-name: overworld\n"));
        assert!(text.contains("border: 2500.5 # in blocks\n"));
        assert!(text.contains("limits:\n  # Per player\n  chunks: 64\n  entities: 800\n"));
        assert!(text.contains("ranks:\n  steve: admin\n"));
        assert!(text.contains("whitelist:\n  - steve\n  - alex\n"));
    }

    #[test]
    fn round_trip() {
        let serializer = ConfigSerializer::new(Yaml::new());
        let text = serializer.to_string(&world()).unwrap();
        let back: World = serializer.from_str(&text).unwrap();
        assert!(back == world());
    }

    #[test]
    fn custom_indent() {
        let serializer = ConfigSerializer::new(Yaml::new().with_indent(4));
        let text = serializer.to_string(&world()).unwrap();
        assert!(text.contains("limits:\n    # Per player\n    chunks: 64\n"));
    }

    #[test]
    fn empty_containers_stay_inline() {
        let mut adapter = YamlAdapter::new();
        adapter.set("list", Value::Array(vec![])).unwrap();
        adapter.set("map", Value::Map(Map::new())).unwrap();
        let text = Yaml::new().render(&adapter).unwrap();
        assert!(text == "list: []\nmap: {}\n");
    }

    #[test]
    fn parses_scalar_keys() {
        let adapter = Yaml::new().parse("1: one\ntrue: yes\nname: x\nnested:\n  n: 1.5\n").unwrap();
        assert!(adapter.keys() == ["1", "true", "name", "nested"]);
        let nested = adapter.get_map("nested").unwrap();
        assert!(nested.get("n") == Some(&Value::Number(Number::parse("1.5").unwrap())));
        assert!(Yaml::new().parse("").unwrap().keys().is_empty());
        assert!(Yaml::new().parse("- a\n- b\n").is_err());
    }
}
