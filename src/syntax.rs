//! Assertion syntax per output profile.
//!
//! The body synthesizer and the given/when/then fragments never spell a
//! literal or an assertion themselves; they ask the profile. That keeps one
//! synthesis algorithm rendering into every supported dialect.

use crate::config::{RenderConfig, TargetLanguage, TestMode};
use crate::metadata::SingleContractMetadata;
use crate::model::{java_double, BodyValue, Scalar};

/// Where the generated test gets its response from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Harness {
    RestAssured,
    JaxRs,
    Messaging,
}

/// Formatting rules for one (language, harness) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionSyntaxProfile {
    language: TargetLanguage,
    harness: Harness,
}

impl AssertionSyntaxProfile {
    pub fn new(language: TargetLanguage, harness: Harness) -> Self {
        Self { language, harness }
    }

    /// Profile for one contract: messaging contracts always use the
    /// messaging harness, HTTP contracts the configured test mode.
    pub fn for_contract(config: &RenderConfig, metadata: &SingleContractMetadata<'_>) -> Self {
        let harness = if metadata.is_messaging() {
            Harness::Messaging
        } else {
            match config.test_mode {
                TestMode::JaxRsClient => Harness::JaxRs,
                _ => Harness::RestAssured,
            }
        };
        Self::new(config.target_language, harness)
    }

    pub fn language(&self) -> TargetLanguage {
        self.language
    }

    pub fn harness(&self) -> Harness {
        self.harness
    }

    pub fn line_ending(&self) -> &'static str {
        self.language.line_ending()
    }

    pub fn label_prefix(&self) -> &'static str {
        self.language.label_prefix()
    }

    /// Escapes text for a double-quoted literal. Groovy also escapes `$`
    /// outside template placeholders so strings are not interpolated.
    pub fn escape(&self, text: &str) -> String {
        let escaped = escape_java(text);
        match self.language {
            TargetLanguage::Java => escaped,
            TargetLanguage::Groovy => escape_dollars_outside_placeholders(&escaped),
        }
    }

    pub fn quoted(&self, text: &str) -> String {
        format!("\"{}\"", self.escape(text))
    }

    /// Literal for long text such as request bodies.
    pub fn quoted_long(&self, text: &str) -> String {
        match self.language {
            TargetLanguage::Java => self.quoted(text),
            TargetLanguage::Groovy => format!(
                "'''{}'''",
                text.replace('\\', "\\\\").replace('\'', "\\'")
            ),
        }
    }

    /// Literal as the comparison API expects it: longs carry `L`, other
    /// numbers print plainly, text is quoted.
    pub fn literal(&self, value: &BodyValue) -> String {
        match value {
            BodyValue::Scalar(Scalar::Long(long)) => format!("{}L", long),
            BodyValue::Scalar(Scalar::Text(text)) => self.quoted(text),
            BodyValue::Scalar(scalar) => scalar.to_json(),
            BodyValue::Regex(pattern) => self.quoted(pattern),
            BodyValue::ComputedRef(command) => command.command().to_string(),
            other => self.quoted(&other.to_json()),
        }
    }

    /// Literal for a typed read: doubles carry `D` and big decimals are
    /// quoted so no precision is lost.
    pub fn typed_literal(&self, value: &BodyValue) -> String {
        match value {
            BodyValue::Scalar(Scalar::Double(double)) => format!("{}D", java_double(*double)),
            BodyValue::Scalar(Scalar::Decimal(decimal)) => self.quoted(&decimal.to_string()),
            other => self.literal(other),
        }
    }

    /// Class literal of the value for `parsedJson.read(path, X.class)`.
    /// `java.lang` types use their simple name.
    pub fn class_literal(&self, value: &BodyValue) -> String {
        let name = value.jvm_type();
        let name = name.strip_prefix("java.lang.").unwrap_or(name);
        format!("{}.class", name)
    }

    pub fn assert_that(&self, object: &str) -> String {
        format!("assertThat({})", object)
    }

    pub fn is_equal_to(&self, literal: &str) -> String {
        format!(".isEqualTo({})", literal)
    }

    pub fn matches(&self, pattern: &str) -> String {
        format!(".matches({})", self.quoted(pattern))
    }

    pub fn is_not_null(&self) -> &'static str {
        ".isNotNull()"
    }

    pub fn is_null(&self) -> &'static str {
        ".isNull()"
    }

    pub fn assert_not_null(&self, object: &str) -> String {
        format!("{}{}", self.assert_that(object), self.is_not_null())
    }

    /// `assertThat(object)` compared against `value`: regexes match,
    /// commands bind to the object, everything else is equality.
    pub fn assert_value(&self, object: &str, value: &BodyValue) -> String {
        match value {
            BodyValue::Regex(pattern) => format!("{}{}", self.assert_that(object), self.matches(pattern)),
            BodyValue::ComputedRef(command) => command.insert_value(object),
            other => format!(
                "{}{}",
                self.assert_that(object),
                self.is_equal_to(&self.literal(other))
            ),
        }
    }

    pub fn status_accessor(&self) -> &'static str {
        match self.harness {
            Harness::JaxRs => "response.getStatus()",
            _ => "response.statusCode()",
        }
    }

    pub fn response_as_string(&self) -> &'static str {
        match self.harness {
            Harness::RestAssured => "response.getBody().asString()",
            Harness::JaxRs => "responseAsString",
            Harness::Messaging => "contractVerifierObjectMapper.writeValueAsString(response.getPayload())",
        }
    }

    pub fn byte_array_accessor(&self) -> &'static str {
        match self.harness {
            Harness::RestAssured => "response.getBody().asByteArray()",
            Harness::JaxRs => "response.readEntity(byte[].class)",
            Harness::Messaging => "contractVerifierObjectMapper.writeValueAsBytes(response.getPayload())",
        }
    }

    pub fn header_accessor(&self, name: &str) -> String {
        let name = self.quoted(name);
        match self.harness {
            Harness::RestAssured => format!("response.header({})", name),
            Harness::JaxRs => format!("response.getHeaderString({})", name),
            Harness::Messaging => format!("response.getHeader({})", name),
        }
    }

    pub fn cookie_accessor(&self, name: &str) -> String {
        let name = self.quoted(name);
        match self.harness {
            Harness::JaxRs => format!("response.getCookies().get({})", name),
            _ => format!("response.cookie({})", name),
        }
    }

    /// Accessor of the cookie's value, as opposed to the cookie itself.
    pub fn cookie_value_accessor(&self, name: &str) -> String {
        match self.harness {
            Harness::JaxRs => format!("{}.getValue()", self.cookie_accessor(name)),
            _ => self.cookie_accessor(name),
        }
    }
}

/// Java string escaping: quotes, backslashes, control characters and
/// non-ASCII characters as `\uXXXX`.
pub fn escape_java(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7f => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Escapes `$` as `\$` except inside `{{...}}` / `{{{...}}}` placeholders,
/// whose content must reach the template processor untouched.
pub fn escape_dollars_outside_placeholders(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open].replace('$', "\\$"));
        let tail = &rest[open..];
        match tail.find("}}") {
            Some(close) => {
                let mut end = close + 2;
                if tail[end..].starts_with('}') {
                    end += 1;
                }
                out.push_str(&tail[..end]);
                rest = &tail[end..];
            }
            None => {
                out.push_str(&tail.replace('$', "\\$"));
                rest = "";
            }
        }
    }
    out.push_str(&rest.replace('$', "\\$"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn java() -> AssertionSyntaxProfile {
        AssertionSyntaxProfile::new(TargetLanguage::Java, Harness::RestAssured)
    }

    fn groovy() -> AssertionSyntaxProfile {
        AssertionSyntaxProfile::new(TargetLanguage::Groovy, Harness::RestAssured)
    }

    #[test]
    fn java_escaping() {
        assert_eq!(escape_java("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
        assert_eq!(escape_java("é"), "\\u00E9");
        assert_eq!(java().quoted("$.id"), "\"$.id\"");
    }

    #[test]
    fn groovy_escapes_dollars_but_not_inside_placeholders() {
        assert_eq!(groovy().quoted("$.id"), "\"\\$.id\"");
        assert_eq!(
            groovy().quoted("{{{jsonPath request.body '$.id'}}} costs $5"),
            "\"{{{jsonPath request.body '$.id'}}} costs \\$5\""
        );
        assert_eq!(
            escape_dollars_outside_placeholders("{{request.path}}$"),
            "{{request.path}}\\$"
        );
    }

    #[test]
    fn numeric_literals() {
        let profile = java();
        assert_eq!(profile.literal(&BodyValue::long(5)), "5L");
        assert_eq!(profile.literal(&BodyValue::int(5)), "5");
        assert_eq!(profile.typed_literal(&BodyValue::double(1.5)), "1.5D");
        assert_eq!(
            profile.typed_literal(&BodyValue::decimal(Decimal::from_str("10.50").unwrap())),
            "\"10.50\""
        );
    }

    #[test]
    fn class_literals_shorten_java_lang() {
        let profile = java();
        assert_eq!(profile.class_literal(&BodyValue::text("a")), "String.class");
        assert_eq!(
            profile.class_literal(&BodyValue::decimal(Decimal::new(1, 0))),
            "java.math.BigDecimal.class"
        );
    }

    #[test]
    fn comparisons() {
        let profile = java();
        assert_eq!(
            profile.assert_value("response.header(\"A\")", &BodyValue::regex("[0-9]+")),
            "assertThat(response.header(\"A\")).matches(\"[0-9]+\")"
        );
        assert_eq!(
            profile.assert_value("x", &BodyValue::command("check($it)")),
            "check(x)"
        );
        assert_eq!(profile.assert_not_null("x"), "assertThat(x).isNotNull()");
    }

    #[test]
    fn dialect_tokens() {
        assert_eq!(java().line_ending(), ";");
        assert_eq!(java().label_prefix(), "// ");
        assert_eq!(groovy().line_ending(), "");
        assert_eq!(groovy().label_prefix(), "");
        assert_eq!(groovy().quoted_long("{\"a\":1}"), "'''{\"a\":1}'''");
    }

    #[test]
    fn groovy_long_literals_escape_single_quotes() {
        assert_eq!(groovy().quoted_long("say 'hi'"), r"'''say \'hi\''''");
        assert_eq!(groovy().quoted_long("a'''b"), r"'''a\'\'\'b'''");
        assert_eq!(groovy().quoted_long(r"c:\tmp"), r"'''c:\\tmp'''");
    }
}
