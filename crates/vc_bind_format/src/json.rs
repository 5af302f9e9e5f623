use alloc::string::String;
use alloc::vec::Vec;

use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use vc_bind::config::{ConfigAdapter, ConfigFormat};
use vc_bind::error::Error;
use vc_bind::tree::{Map, Number, Value};

const FORMAT_NAME: &str = "JSON";

// -----------------------------------------------------------------------------
// Conversion

fn number_from_json(number: &JsonNumber) -> Value {
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

fn from_json(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(bool) => Value::Bool(*bool),
        JsonValue::Number(number) => number_from_json(number),
        JsonValue::String(string) => Value::String(string.clone()),
        JsonValue::Array(array) => Value::Array(array.iter().map(from_json).collect()),
        JsonValue::Object(object) => Value::Map(
            object
                .iter()
                .map(|(key, value)| (key.as_str(), from_json(value)))
                .collect(),
        ),
    }
}

/// Integers outside the 64-bit range and decimals go through `f64`.
fn number_to_json(number: &Number) -> JsonValue {
    if let Number::Integer(int) = number {
        if let Ok(int) = i64::try_from(int) {
            return JsonValue::from(int);
        }
        if let Ok(int) = u64::try_from(int) {
            return JsonValue::from(int);
        }
    }
    JsonNumber::from_f64(number.clamped().to_f64()).map_or(JsonValue::Null, JsonValue::Number)
}

fn to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(bool) => JsonValue::Bool(bool),
        Value::Number(number) => number_to_json(&number),
        Value::String(string) => JsonValue::String(string),
        Value::Array(array) => JsonValue::Array(array.into_iter().map(to_json).collect()),
        Value::Map(map) => JsonValue::Object(
            map.into_iter()
                .map(|entry| (entry.key, to_json(entry.value)))
                .collect(),
        ),
    }
}

// -----------------------------------------------------------------------------
// JsonAdapter

/// A JSON object as a configuration document.
///
/// Every shape is stored. Comments are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonAdapter {
    object: JsonMap<String, JsonValue>,
}

impl JsonAdapter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigAdapter for JsonAdapter {
    type Document = JsonMap<String, JsonValue>;

    #[inline]
    fn document(&self) -> &Self::Document {
        &self.object
    }

    #[inline]
    fn into_document(self) -> Self::Document {
        self.object
    }

    #[inline]
    fn load(&mut self, document: Self::Document) {
        self.object = document;
    }

    fn keys(&self) -> Vec<String> {
        self.object.keys().cloned().collect()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.object.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.object.get(key).map(from_json)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.object.insert(String::from(key), to_json(value));
        Ok(())
    }

    fn to_map(&self) -> Map {
        self.object
            .iter()
            .map(|(key, value)| (key.as_str(), from_json(value)))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Json

/// The JSON format, backed by `serde_json`.
///
/// Keys keep their document order. Output is pretty-printed unless
/// [`compact`](Json::compact) is set.
///
/// # Examples
///
/// ```
/// use vc_bind::ConfigSerializer;
/// use vc_bind::derive::Config;
/// use vc_bind_format::Json;
///
/// #[derive(Config, Default, Debug, PartialEq)]
/// #[config(default)]
/// struct Motd {
///     text: String,
///     lines: Vec<String>,
/// }
///
/// let serializer = ConfigSerializer::new(Json::new().compact(true));
/// let motd = Motd { text: "hi".into(), lines: vec!["a".into()] };
///
/// let text = serializer.to_string(&motd).unwrap();
/// assert_eq!(text, r#"{"text":"hi","lines":["a"]}"#);
/// assert_eq!(serializer.from_str::<Motd>(&text).unwrap(), motd);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Json {
    compact: bool,
}

impl Json {
    #[inline]
    pub const fn new() -> Self {
        Self { compact: false }
    }

    /// Renders on a single line.
    #[inline]
    pub const fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

impl ConfigFormat for Json {
    type Adapter = JsonAdapter;

    #[inline]
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    #[inline]
    fn new_adapter(&self) -> JsonAdapter {
        JsonAdapter::new()
    }

    /// Blank text is an empty document.
    fn parse(&self, text: &str) -> Result<JsonAdapter, Error> {
        if text.trim().is_empty() {
            return Ok(JsonAdapter::new());
        }
        match serde_json::from_str(text) {
            Ok(JsonValue::Object(object)) => Ok(JsonAdapter { object }),
            Ok(other) => Err(Error::malformed(
                FORMAT_NAME,
                alloc::format!("expected an object at the root, found {}", from_json(&other).shape()),
            )),
            Err(err) => Err(Error::malformed(FORMAT_NAME, err)),
        }
    }

    fn render(&self, adapter: &JsonAdapter) -> Result<String, Error> {
        let object = JsonValue::Object(adapter.object.clone());
        if self.compact {
            serde_json::to_string(&object)
        } else {
            serde_json::to_string_pretty(&object).map(|mut text| {
                text.push('\n');
                text
            })
        }
        .map_err(|err| Error::malformed(FORMAT_NAME, err))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Json, JsonAdapter};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use alloc::sync::Arc;
    use vc_bind::ConfigSerializer;
    use vc_bind::config::{ConfigAdapter, ConfigFormat};
    use vc_bind::derive::{Config, ConfigEnum};
    use vc_bind::error::{Error, ErrorType, RecordingHandler};
    use vc_bind::tree::{Number, Value};

    #[derive(ConfigEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Channel {
        Stable,
        Nightly,
    }

    #[derive(Config, Debug, Clone, PartialEq)]
    #[config(record)]
    struct Mirror {
        url: String,
        weight: f64,
    }

    #[derive(Config, Debug, PartialEq, Default)]
    #[config(default, key_format = "camel")]
    struct Launcher {
        #[config(comment = "Dropped by JSON")]
        install_dir: String,
        channel: Option<Channel>,
        mirrors: Vec<Mirror>,
        pins: BTreeMap<Channel, u32>,
        max_downloads: u8,
    }

    fn launcher() -> Launcher {
        Launcher {
            install_dir: "/opt/game".into(),
            channel: Some(Channel::Nightly),
            mirrors: vec![Mirror { url: "https://a".into(), weight: 0.5 }],
            pins: [(Channel::Stable, 12)].into_iter().collect(),
            max_downloads: 4,
        }
    }

    #[test]
    fn nested_round_trip() {
        let serializer = ConfigSerializer::new(Json::new());
        let text = serializer.to_string(&launcher()).unwrap();
        assert!(text.contains("\"installDir\": \"/opt/game\""));
        assert!(text.contains("\"channel\": \"nightly\""));
        assert!(!text.contains("Dropped"));

        let back: Launcher = serializer.from_str(&text).unwrap();
        assert!(back == launcher());
    }

    #[test]
    fn keeps_document_order() {
        let adapter = Json::new().parse(r#"{"b": 1, "a": [true, null], "c": {"x": 1.5}}"#).unwrap();
        assert!(adapter.keys() == ["b", "a", "c"]);
        assert!(adapter.get_array("a").unwrap() == [Value::Bool(true), Value::Null]);
        let nested = adapter.get_map("c").unwrap();
        assert!(nested.get("x") == Some(&Value::Number(Number::parse("1.5").unwrap())));
    }

    #[test]
    fn wide_integers_survive() {
        let mut adapter = JsonAdapter::new();
        adapter.set("big", Value::from(u64::MAX)).unwrap();
        adapter.set("neg", Value::from(i64::MIN)).unwrap();
        assert!(adapter.get_number("big") == Some(Number::from(u64::MAX)));
        assert!(adapter.get_number("neg") == Some(Number::from(i64::MIN)));
    }

    #[test]
    fn rejects_non_object_roots() {
        assert!(matches!(Json::new().parse("[1, 2]"), Err(Error::Malformed { .. })));
        assert!(matches!(Json::new().parse("{"), Err(Error::Malformed { .. })));
        assert!(Json::new().parse("  \n").unwrap().keys().is_empty());
    }

    #[test]
    fn wrong_shapes_are_reported() {
        let handler = Arc::new(RecordingHandler::new());
        let serializer = ConfigSerializer::builder(Json::new())
            .shared_error_handler(handler.clone())
            .build();

        let text = r#"{"installDir": 5, "channel": "beta", "maxDownloads": 300, "extra": 1}"#;
        let back: Launcher = serializer.from_str(text).unwrap();
        assert!(back.install_dir == "5");
        assert!(back.channel.is_none());
        assert!(back.max_downloads == u8::MAX);

        let types: Vec<ErrorType> = handler.entries().iter().map(|e| e.ty).collect();
        assert!(types.contains(&ErrorType::Custom));
        assert!(types.contains(&ErrorType::KeyNotFound));
        assert!(types.contains(&ErrorType::UnexpectedKey));
    }
}
