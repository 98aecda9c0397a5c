//! Body values: the closed union every request/response/message body is made of.

use rust_decimal::Decimal;

/// A single body value, after references have been resolved to their
/// test-side representation.
///
/// Mappings keep their insertion order; rendering iterates them in that
/// order so output stays deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    Scalar(Scalar),
    /// A regular expression the value must match.
    Regex(String),
    /// Content loaded from a file next to the contract.
    FileRef(FromFile),
    /// A caller-supplied verification expression, bound to an accessor at render time.
    ComputedRef(ExecutionCommand),
    Sequence(Vec<BodyValue>),
    Mapping(Vec<(String, BodyValue)>),
}

/// Leaf values. Integer widths follow how a JSON parser on the JVM side
/// would type the value, since that decides literal suffixes.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    Text(String),
}

impl BodyValue {
    pub fn text(value: impl Into<String>) -> Self {
        BodyValue::Scalar(Scalar::Text(value.into()))
    }

    pub fn int(value: i32) -> Self {
        BodyValue::Scalar(Scalar::Int(value))
    }

    pub fn long(value: i64) -> Self {
        BodyValue::Scalar(Scalar::Long(value))
    }

    pub fn double(value: f64) -> Self {
        BodyValue::Scalar(Scalar::Double(value))
    }

    pub fn decimal(value: Decimal) -> Self {
        BodyValue::Scalar(Scalar::Decimal(value))
    }

    pub fn boolean(value: bool) -> Self {
        BodyValue::Scalar(Scalar::Bool(value))
    }

    pub fn null() -> Self {
        BodyValue::Scalar(Scalar::Null)
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        BodyValue::Regex(pattern.into())
    }

    pub fn command(command: impl Into<String>) -> Self {
        BodyValue::ComputedRef(ExecutionCommand::new(command))
    }

    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, BodyValue)>,
    {
        BodyValue::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn sequence<I: IntoIterator<Item = BodyValue>>(items: I) -> Self {
        BodyValue::Sequence(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BodyValue::Scalar(Scalar::Null))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, BodyValue::Sequence(_) | BodyValue::Mapping(_))
    }

    /// Strings, numbers, booleans and patterns.
    pub fn is_primitive(&self) -> bool {
        match self {
            BodyValue::Scalar(Scalar::Null) => false,
            BodyValue::Scalar(_) | BodyValue::Regex(_) => true,
            _ => false,
        }
    }

    /// An empty collection, or a collection made only of empty collections.
    pub fn is_empty_container(&self) -> bool {
        match self {
            BodyValue::Sequence(items) => items.iter().all(BodyValue::is_empty_container),
            BodyValue::Mapping(entries) => entries.iter().all(|(_, v)| v.is_empty_container()),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BodyValue::Scalar(Scalar::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Looks up a key in a mapping.
    pub fn get(&self, key: &str) -> Option<&BodyValue> {
        match self {
            BodyValue::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut BodyValue> {
        match self {
            BodyValue::Mapping(entries) => entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Applies `f` to every text leaf, depth first.
    pub fn map_text<F>(&self, f: &mut F) -> BodyValue
    where
        F: FnMut(&str) -> String,
    {
        match self {
            BodyValue::Scalar(Scalar::Text(text)) => BodyValue::text(f(text)),
            BodyValue::Sequence(items) => {
                BodyValue::Sequence(items.iter().map(|item| item.map_text(f)).collect())
            }
            BodyValue::Mapping(entries) => BodyValue::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.map_text(f)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Compact JSON rendering in insertion order.
    ///
    /// Patterns render as their source text and commands as the command
    /// string, both as JSON strings.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out);
        out
    }

    fn write_json(&self, out: &mut String) {
        match self {
            BodyValue::Scalar(scalar) => out.push_str(&scalar.to_json()),
            BodyValue::Regex(pattern) => out.push_str(&json_string(pattern)),
            BodyValue::FileRef(file) => out.push_str(&json_string(&file.as_string())),
            BodyValue::ComputedRef(command) => out.push_str(&json_string(command.command())),
            BodyValue::Sequence(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    item.write_json(out);
                }
                out.push(']');
            }
            BodyValue::Mapping(entries) => {
                out.push('{');
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    out.push_str(&json_string(key));
                    out.push(':');
                    value.write_json(out);
                }
                out.push('}');
            }
        }
    }

    /// Fully qualified JVM type a JSON reader would produce for this value.
    pub fn jvm_type(&self) -> &'static str {
        match self {
            BodyValue::Scalar(scalar) => scalar.jvm_type(),
            BodyValue::Regex(_) | BodyValue::ComputedRef(_) => "java.lang.String",
            BodyValue::FileRef(file) if file.is_byte() => "byte[]",
            BodyValue::FileRef(_) => "java.lang.String",
            BodyValue::Sequence(_) => "java.util.List",
            BodyValue::Mapping(_) => "java.util.Map",
        }
    }

    /// Parses JSON text into a body value, or `None` when the text is not JSON.
    pub fn parse_json(text: &str) -> Option<BodyValue> {
        serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .map(BodyValue::from)
    }
}

impl Scalar {
    pub fn to_json(&self) -> String {
        match self {
            Scalar::Null => "null".to_string(),
            Scalar::Bool(value) => value.to_string(),
            Scalar::Int(value) => value.to_string(),
            Scalar::Long(value) => value.to_string(),
            Scalar::Double(value) => java_double(*value),
            Scalar::Decimal(value) => value.to_string(),
            Scalar::Text(value) => json_string(value),
        }
    }

    /// The value as it would print on the JVM (`String.valueOf`).
    pub fn display(&self) -> String {
        match self {
            Scalar::Text(value) => value.clone(),
            other => other.to_json(),
        }
    }

    pub fn jvm_type(&self) -> &'static str {
        match self {
            Scalar::Null => "java.lang.Object",
            Scalar::Bool(_) => "java.lang.Boolean",
            Scalar::Int(_) => "java.lang.Integer",
            Scalar::Long(_) => "java.lang.Long",
            Scalar::Double(_) => "java.lang.Double",
            Scalar::Decimal(_) => "java.math.BigDecimal",
            Scalar::Text(_) => "java.lang.String",
        }
    }
}

/// Formats a double the way `String.valueOf(double)` does for ordinary values.
pub fn java_double(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') && !text.contains('e') {
        format!("{}.0", text)
    } else {
        text
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl From<serde_json::Value> for BodyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => BodyValue::null(),
            serde_json::Value::Bool(b) => BodyValue::boolean(b),
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    match i32::try_from(int) {
                        Ok(small) => BodyValue::int(small),
                        Err(_) => BodyValue::long(int),
                    }
                } else {
                    BodyValue::double(number.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(text) => BodyValue::text(text),
            serde_json::Value::Array(items) => {
                BodyValue::Sequence(items.into_iter().map(BodyValue::from).collect())
            }
            serde_json::Value::Object(map) => BodyValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, BodyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for BodyValue {
    fn from(value: &str) -> Self {
        BodyValue::text(value)
    }
}

/// Encoding of a file-backed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEncoding {
    Bytes,
    Text { charset: Option<String> },
}

/// A body (or body part) whose content lives in a file next to the contract.
///
/// The contract parser has already read the bytes; rendering only decides
/// how the generated test loads them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromFile {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub encoding: FileEncoding,
}

impl FromFile {
    pub fn bytes(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
            encoding: FileEncoding::Bytes,
        }
    }

    pub fn text(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into().into_bytes(),
            encoding: FileEncoding::Text { charset: None },
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.encoding = FileEncoding::Text {
            charset: Some(charset.into()),
        };
        self
    }

    pub fn is_byte(&self) -> bool {
        self.encoding == FileEncoding::Bytes
    }

    pub fn charset(&self) -> Option<&str> {
        match &self.encoding {
            FileEncoding::Text { charset } => charset.as_deref(),
            FileEncoding::Bytes => None,
        }
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// A verification expression with a `$it` placeholder for the value accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionCommand {
    command: String,
}

impl ExecutionCommand {
    pub const PLACEHOLDER: &'static str = "$it";

    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Binds the command to an accessor expression.
    pub fn insert_value(&self, accessor: &str) -> String {
        self.command.replace(Self::PLACEHOLDER, accessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_keeps_declaration_order() {
        let body = BodyValue::from(json!({"name": "a", "id": 1, "tags": ["x", 2.5]}));
        assert_eq!(body.to_json(), r#"{"name":"a","id":1,"tags":["x",2.5]}"#);
    }

    #[test]
    fn integer_width_follows_jvm_parsing() {
        assert_eq!(BodyValue::from(json!(7)), BodyValue::int(7));
        assert_eq!(
            BodyValue::from(json!(9_000_000_000i64)),
            BodyValue::long(9_000_000_000)
        );
    }

    #[test]
    fn doubles_print_like_the_jvm() {
        assert_eq!(java_double(1.0), "1.0");
        assert_eq!(java_double(0.25), "0.25");
    }

    #[test]
    fn empty_container_detection_is_recursive() {
        assert!(BodyValue::from(json!([[], {}])).is_empty_container());
        assert!(!BodyValue::from(json!([[1]])).is_empty_container());
        assert!(!BodyValue::text("").is_empty_container());
    }

    #[test]
    fn command_binds_accessor() {
        let command = ExecutionCommand::new("assertThatUserIsValid($it)");
        assert_eq!(
            command.insert_value("parsedJson.read(\"$.user\")"),
            "assertThatUserIsValid(parsedJson.read(\"$.user\"))"
        );
    }
}
