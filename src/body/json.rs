//! JSON body verification.

use crate::collaborators::template::{is_placeholder, TemplateProcessor};
use crate::jsonpath::{self, is_array_related, location_to_path, JsonPath, JsonPathError, Step};
use crate::model::{
    BodyMatcher, BodyMatchers, BodyValue, ExecutionCommand, MatchingType, Request, Scalar,
};
use crate::syntax::AssertionSyntaxProfile;
use crate::{RenderError, RenderResult};

use super::{AssertionKind, BodyAssertion, BodySynthesis};

/// The body as a JSON tree, when it is one.
///
/// Text is parsed; file-backed text bodies are parsed from their contents.
pub fn json_body(body: &BodyValue) -> Option<BodyValue> {
    let parsed = match body {
        BodyValue::Mapping(_) | BodyValue::Sequence(_) => Some(body.clone()),
        BodyValue::Scalar(Scalar::Text(text)) => BodyValue::parse_json(text),
        BodyValue::FileRef(file) if !file.is_byte() => BodyValue::parse_json(&file.as_string()),
        _ => None,
    };
    parsed.filter(BodyValue::is_collection)
}

/// Synthesizes `assertThatJson` residual assertions and JSON-path matcher
/// assertions for one body.
pub struct JsonBodySynthesizer<'a> {
    profile: AssertionSyntaxProfile,
    assert_json_size: bool,
    templates: Option<(&'a dyn TemplateProcessor, &'a Request)>,
}

impl<'a> JsonBodySynthesizer<'a> {
    pub fn new(profile: AssertionSyntaxProfile) -> Self {
        Self {
            profile,
            assert_json_size: false,
            templates: None,
        }
    }

    /// Verify arrays by index and size instead of containment.
    pub fn with_assert_json_size(mut self, assert_json_size: bool) -> Self {
        self.assert_json_size = assert_json_size;
        self
    }

    /// Resolve request placeholders in residual text leaves.
    pub fn with_templates(mut self, templates: &'a dyn TemplateProcessor, request: &'a Request) -> Self {
        self.templates = Some((templates, request));
        self
    }

    /// `source` is the expression yielding the body as a string.
    pub fn synthesize(
        &self,
        body: &BodyValue,
        matchers: &BodyMatchers,
        source: &str,
    ) -> RenderResult<BodySynthesis> {
        let original = json_body(body).ok_or_else(|| RenderError::MalformedContract {
            message: "body is not a JSON document".into(),
            path: None,
            body: Some(body.to_json()),
        })?;

        let mut synthesis = BodySynthesis {
            declarations: vec![format!("DocumentContext parsedJson = JsonPath.parse({})", source)],
            ..BodySynthesis::default()
        };

        let remaining = jsonpath::remove_matching_paths(&original, matchers);
        match &remaining {
            BodyValue::Mapping(entries) if !entries.is_empty() => {
                self.residual_mapping("", entries, &[], false, &mut synthesis.residual);
            }
            BodyValue::Sequence(items) if !items.is_empty() => {
                let chain = if items.iter().all(BodyValue::is_primitive) { "" } else { ".array()" };
                self.residual_sequence(chain, items, &[], &mut synthesis.residual);
            }
            _ => {}
        }

        for matcher in matchers {
            self.matcher_assertions(&original, matcher, &mut synthesis.matched)?;
        }
        Ok(synthesis)
    }

    fn residual_mapping(
        &self,
        chain: &str,
        entries: &[(String, BodyValue)],
        location: &[Step],
        in_array: bool,
        out: &mut Vec<BodyAssertion>,
    ) {
        for (key, value) in entries {
            let location = child(location, Step::Key(key.clone()));
            let field = self.profile.quoted(&format!("['{}']", key));
            match value {
                BodyValue::Mapping(inner) if inner.is_empty() => out.push(BodyAssertion::new(
                    location_to_path(&location),
                    AssertionKind::Equality,
                    format!("assertThatJson(parsedJson){}.field({}).isEmpty()", chain, field),
                )),
                BodyValue::Mapping(inner) => {
                    let chain = format!("{}.field({})", chain, field);
                    self.residual_mapping(&chain, inner, &location, in_array, out);
                }
                BodyValue::Sequence(items) if items.is_empty() => out.push(BodyAssertion::new(
                    location_to_path(&location),
                    AssertionKind::Equality,
                    format!("assertThatJson(parsedJson){}.array({}).isEmpty()", chain, field),
                )),
                BodyValue::Sequence(items) => {
                    let chain = format!("{}.array({})", chain, field);
                    self.residual_sequence(&chain, items, &location, out);
                }
                leaf => {
                    let accessor = if in_array { "contains" } else { "field" };
                    let chain = format!("{}.{}({})", chain, accessor, field);
                    self.residual_leaf(&chain, leaf, &location, "", out);
                }
            }
        }
    }

    fn residual_sequence(
        &self,
        chain: &str,
        items: &[BodyValue],
        location: &[Step],
        out: &mut Vec<BodyAssertion>,
    ) {
        if items.iter().all(BodyValue::is_primitive) {
            if self.assert_json_size {
                out.push(BodyAssertion::new(
                    location_to_path(location),
                    AssertionKind::Size,
                    format!("assertThatJson(parsedJson){}.hasSize({})", chain, items.len()),
                ));
            }
            for (idx, item) in items.iter().enumerate() {
                let location = child(location, Step::Index(idx));
                if self.assert_json_size {
                    let chain = format!("{}.elementWithIndex({})", chain, idx);
                    self.residual_leaf(&chain, item, &location, "", out);
                } else {
                    let chain = format!("{}.arrayField()", chain);
                    self.residual_leaf(&chain, item, &location, ".value()", out);
                }
            }
            return;
        }

        for (idx, item) in items.iter().enumerate() {
            let location = child(location, Step::Index(idx));
            let item_chain = if self.assert_json_size {
                format!("{}.elementWithIndex({})", chain, idx)
            } else {
                chain.to_string()
            };
            match item {
                BodyValue::Mapping(entries) if !entries.is_empty() => {
                    self.residual_mapping(&item_chain, entries, &location, !self.assert_json_size, out);
                }
                BodyValue::Sequence(inner) if !inner.is_empty() => {
                    let chain = format!("{}.array()", item_chain);
                    self.residual_sequence(&chain, inner, &location, out);
                }
                BodyValue::Mapping(_) | BodyValue::Sequence(_) => {
                    // Unordered verification has nothing to search for in an empty element.
                    if self.assert_json_size {
                        out.push(BodyAssertion::new(
                            location_to_path(&location),
                            AssertionKind::Equality,
                            format!("assertThatJson(parsedJson){}.isEmpty()", item_chain),
                        ));
                    }
                }
                leaf if self.assert_json_size => {
                    self.residual_leaf(&item_chain, leaf, &location, "", out);
                }
                leaf => {
                    let chain = format!("{}.arrayField()", chain);
                    self.residual_leaf(&chain, leaf, &location, ".value()", out);
                }
            }
        }
    }

    fn residual_leaf(
        &self,
        chain: &str,
        value: &BodyValue,
        location: &[Step],
        suffix: &str,
        out: &mut Vec<BodyAssertion>,
    ) {
        let path = location_to_path(location);
        let value = self.resolve_templates(value);
        let (kind, line) = match &value {
            BodyValue::Scalar(Scalar::Null) => (
                AssertionKind::Equality,
                format!("assertThatJson(parsedJson){}.isNull(){}", chain, suffix),
            ),
            BodyValue::Regex(pattern) => (
                AssertionKind::Regex,
                format!(
                    "assertThatJson(parsedJson){}.matches({}){}",
                    chain,
                    self.profile.quoted(pattern),
                    suffix
                ),
            ),
            BodyValue::ComputedRef(command) => (
                AssertionKind::Command,
                command.insert_value(&format!("parsedJson.read({})", self.profile.quoted(&path))),
            ),
            BodyValue::FileRef(file) => (
                AssertionKind::Equality,
                format!(
                    "assertThatJson(parsedJson){}.isEqualTo({}){}",
                    chain,
                    self.profile.quoted(&file.as_string()),
                    suffix
                ),
            ),
            other => (
                AssertionKind::Equality,
                format!(
                    "assertThatJson(parsedJson){}.isEqualTo({}){}",
                    chain,
                    self.profile.literal(other),
                    suffix
                ),
            ),
        };
        out.push(BodyAssertion::new(path, kind, line));
    }

    /// Text leaves referencing the request are resolved against it. A lone
    /// placeholder resolving to a number or boolean keeps that type.
    fn resolve_templates(&self, value: &BodyValue) -> BodyValue {
        let (templates, request) = match self.templates {
            Some(pair) => pair,
            None => return value.clone(),
        };
        let text = match value.as_text() {
            Some(text) if templates.contains_template_entry(text) => text,
            _ => return value.clone(),
        };
        let resolved = templates.transform(request, text);
        if resolved == text {
            return value.clone();
        }
        if is_placeholder(text) {
            if let Some(typed) = BodyValue::parse_json(&resolved) {
                if let BodyValue::Scalar(scalar) = &typed {
                    if !matches!(scalar, Scalar::Null | Scalar::Text(_)) {
                        return typed;
                    }
                }
            }
        }
        BodyValue::text(resolved)
    }

    fn matcher_assertions(
        &self,
        original: &BodyValue,
        matcher: &BodyMatcher,
        out: &mut Vec<BodyAssertion>,
    ) -> RenderResult<()> {
        let path = self.profile.quoted(&matcher.path);
        let matching_type = matcher.matching_type;
        match matching_type {
            MatchingType::Null => out.push(BodyAssertion::new(
                &matcher.path,
                AssertionKind::Null,
                format!("assertThat((Object) parsedJson.read({})).isNull()", path),
            )),
            MatchingType::Command => {
                read(original, &matcher.path)?;
                let command = command_of(matcher)?;
                out.push(BodyAssertion::new(
                    &matcher.path,
                    AssertionKind::Command,
                    command.insert_value(&format!("parsedJson.read({})", path)),
                ));
            }
            MatchingType::Type => {
                let element = match &matcher.value {
                    Some(value) => value.clone(),
                    None => read(original, &matcher.path)?,
                };
                out.push(BodyAssertion::new(
                    &matcher.path,
                    AssertionKind::Type,
                    format!(
                        "assertThat((Object) parsedJson.read({})).isInstanceOf({}.class)",
                        path,
                        element.jvm_type()
                    ),
                ));
                if matcher.has_occurrence_bounds() {
                    out.push(BodyAssertion::new(
                        &matcher.path,
                        AssertionKind::Size,
                        format!(
                            "assertThat((java.lang.Iterable) parsedJson.read({}, java.util.Collection.class)).{}",
                            path,
                            size_check(matcher, &path)
                        ),
                    ));
                }
            }
            _ => {
                let is_equality = matching_type == MatchingType::Equality;
                let value = match matcher.effective_value() {
                    Some(value) if !is_equality => value,
                    _ => read(original, &matcher.path)?,
                };
                let (literal, class) = match &value {
                    BodyValue::Regex(pattern) => (self.profile.quoted(pattern), "String.class".to_string()),
                    other => (self.profile.typed_literal(other), self.profile.class_literal(other)),
                };
                let line = if is_array_related(&matcher.path) && matching_type.is_regex_related() {
                    format!(
                        "assertThat((java.lang.Iterable) parsedJson.read({p}, java.util.Collection.class)).as({p}).allElementsMatch({v})",
                        p = path,
                        v = literal
                    )
                } else {
                    let comparison = if is_equality { "isEqualTo" } else { "matches" };
                    format!(
                        "assertThat(parsedJson.read({}, {})).{}({})",
                        path, class, comparison, literal
                    )
                };
                let kind = if is_equality {
                    AssertionKind::Equality
                } else {
                    AssertionKind::Regex
                };
                out.push(BodyAssertion::new(&matcher.path, kind, line));
            }
        }
        Ok(())
    }
}

fn size_check(matcher: &BodyMatcher, quoted_path: &str) -> String {
    let flattened = if is_array_related(&matcher.path) {
        "Flattened"
    } else {
        ""
    };
    let prefix = format!("as({}).has{}Size", quoted_path, flattened);
    match (matcher.min_occurrence, matcher.max_occurrence) {
        (Some(min), Some(max)) => format!("{}Between({}, {})", prefix, min, max),
        (Some(min), None) => format!("{}GreaterThanOrEqualTo({})", prefix, min),
        (None, Some(max)) => format!("{}LessThanOrEqualTo({})", prefix, max),
        (None, None) => prefix,
    }
}

fn command_of(matcher: &BodyMatcher) -> RenderResult<ExecutionCommand> {
    match &matcher.value {
        Some(BodyValue::ComputedRef(command)) => Ok(command.clone()),
        Some(BodyValue::Scalar(Scalar::Text(text))) => Ok(ExecutionCommand::new(text.as_str())),
        _ => Err(RenderError::MalformedContract {
            message: "command matcher carries no command".into(),
            path: Some(matcher.path.clone()),
            body: None,
        }),
    }
}

/// Reads `path` from the unmodified body, reporting a missing entry with a
/// snapshot of the body.
fn read(body: &BodyValue, path: &str) -> RenderResult<BodyValue> {
    JsonPath::parse(path)
        .and_then(|parsed| parsed.read(body))
        .map_err(|e| match e {
            JsonPathError::NotFound { .. } => RenderError::path_not_found(path, body.to_json()),
            JsonPathError::Invalid { message, .. } => RenderError::MalformedContract {
                message: format!("invalid JSON path: {}", message),
                path: Some(path.to_string()),
                body: None,
            },
        })
}

fn child(location: &[Step], step: Step) -> Vec<Step> {
    let mut next = location.to_vec();
    next.push(step);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::RequestTemplateProcessor;
    use crate::config::TargetLanguage;
    use crate::model::Url;
    use crate::syntax::Harness;
    use serde_json::json;

    fn java() -> AssertionSyntaxProfile {
        AssertionSyntaxProfile::new(TargetLanguage::Java, Harness::RestAssured)
    }

    fn lines(assertions: &[BodyAssertion]) -> Vec<&str> {
        assertions.iter().map(|a| a.line.as_str()).collect()
    }

    const SOURCE: &str = "response.getBody().asString()";

    #[test]
    fn nested_fields_and_arrays() {
        let body = BodyValue::from(json!({
            "user": {"name": "Ann"},
            "tags": ["a", "b"],
            "orders": [{"id": 5}],
            "deleted": null,
            "notes": []
        }));
        let synthesis = JsonBodySynthesizer::new(java())
            .synthesize(&body, &BodyMatchers::new(), SOURCE)
            .unwrap();
        assert_eq!(
            synthesis.declarations,
            vec!["DocumentContext parsedJson = JsonPath.parse(response.getBody().asString())"]
        );
        assert_eq!(
            lines(&synthesis.residual),
            vec![
                "assertThatJson(parsedJson).field(\"['user']\").field(\"['name']\").isEqualTo(\"Ann\")",
                "assertThatJson(parsedJson).array(\"['tags']\").arrayField().isEqualTo(\"a\").value()",
                "assertThatJson(parsedJson).array(\"['tags']\").arrayField().isEqualTo(\"b\").value()",
                "assertThatJson(parsedJson).array(\"['orders']\").contains(\"['id']\").isEqualTo(5)",
                "assertThatJson(parsedJson).field(\"['deleted']\").isNull()",
                "assertThatJson(parsedJson).array(\"['notes']\").isEmpty()",
            ]
        );
        assert_eq!(synthesis.residual[2].path, "$['tags'][1]");
        assert_eq!(synthesis.residual[3].path, "$['orders'][0]['id']");
        assert!(synthesis.matched.is_empty());
    }

    #[test]
    fn ordered_verification_asserts_sizes_and_indices() {
        let body = BodyValue::from(json!({"tags": ["a", "b"]}));
        let synthesis = JsonBodySynthesizer::new(java())
            .with_assert_json_size(true)
            .synthesize(&body, &BodyMatchers::new(), SOURCE)
            .unwrap();
        assert_eq!(
            lines(&synthesis.residual),
            vec![
                "assertThatJson(parsedJson).array(\"['tags']\").hasSize(2)",
                "assertThatJson(parsedJson).array(\"['tags']\").elementWithIndex(0).isEqualTo(\"a\")",
                "assertThatJson(parsedJson).array(\"['tags']\").elementWithIndex(1).isEqualTo(\"b\")",
            ]
        );
        assert_eq!(synthesis.residual[0].kind, AssertionKind::Size);
    }

    #[test]
    fn numeric_literals_in_matchers() {
        let body = BodyValue::from(json!({"big": 5000000000i64, "ratio": 1.5, "count": 3}));
        let matchers = BodyMatchers::new()
            .with(BodyMatcher::equality("$.big"))
            .with(BodyMatcher::equality("$.ratio"))
            .with(BodyMatcher::equality("$.count"));
        let synthesis = JsonBodySynthesizer::new(java())
            .synthesize(&body, &matchers, SOURCE)
            .unwrap();
        assert!(synthesis.residual.is_empty());
        assert_eq!(
            lines(&synthesis.matched),
            vec![
                "assertThat(parsedJson.read(\"$.big\", Long.class)).isEqualTo(5000000000L)",
                "assertThat(parsedJson.read(\"$.ratio\", Double.class)).isEqualTo(1.5D)",
                "assertThat(parsedJson.read(\"$.count\", Integer.class)).isEqualTo(3)",
            ]
        );
    }

    #[test]
    fn regex_matchers_over_arrays_match_every_element() {
        let body = BodyValue::from(json!({"ids": ["a1", "b2"], "code": "X"}));
        let matchers = BodyMatchers::new()
            .with(BodyMatcher::regex("$.ids[*]", "[a-z][0-9]"))
            .with(BodyMatcher::regex("$.code", "[A-Z]"));
        let synthesis = JsonBodySynthesizer::new(java())
            .synthesize(&body, &matchers, SOURCE)
            .unwrap();
        assert!(synthesis.residual.is_empty());
        assert_eq!(
            lines(&synthesis.matched),
            vec![
                "assertThat((java.lang.Iterable) parsedJson.read(\"$.ids[*]\", java.util.Collection.class)).as(\"$.ids[*]\").allElementsMatch(\"[a-z][0-9]\")",
                "assertThat(parsedJson.read(\"$.code\", String.class)).matches(\"[A-Z]\")",
            ]
        );
    }

    #[test]
    fn type_matchers_with_bounds() {
        let body = BodyValue::from(json!({"user": {"roles": ["a"]}}));
        let matchers = BodyMatchers::new()
            .with(BodyMatcher::type_of("$.user.roles").with_min(1).with_max(3))
            .with(BodyMatcher::type_of("$.user"));
        let synthesis = JsonBodySynthesizer::new(java())
            .synthesize(&body, &matchers, SOURCE)
            .unwrap();
        assert_eq!(
            lines(&synthesis.matched),
            vec![
                "assertThat((Object) parsedJson.read(\"$.user.roles\")).isInstanceOf(java.util.List.class)",
                "assertThat((java.lang.Iterable) parsedJson.read(\"$.user.roles\", java.util.Collection.class)).as(\"$.user.roles\").hasSizeBetween(1, 3)",
                "assertThat((Object) parsedJson.read(\"$.user\")).isInstanceOf(java.util.Map.class)",
            ]
        );
    }

    #[test]
    fn missing_paths_report_the_body() {
        let body = BodyValue::from(json!({"id": 1}));
        let matchers = BodyMatchers::new().with(BodyMatcher::type_of("$.name"));
        let err = JsonBodySynthesizer::new(java())
            .synthesize(&body, &matchers, SOURCE)
            .unwrap_err();
        match err {
            RenderError::MalformedContract { path, body, .. } => {
                assert_eq!(path.as_deref(), Some("$.name"));
                assert_eq!(body.as_deref(), Some("{\"id\":1}"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn groovy_escapes_dollars_in_paths() {
        let profile = AssertionSyntaxProfile::new(TargetLanguage::Groovy, Harness::RestAssured);
        let body = BodyValue::from(json!({"id": 1}));
        let matchers = BodyMatchers::new().with(BodyMatcher::null("$.id"));
        let synthesis = JsonBodySynthesizer::new(profile)
            .synthesize(&body, &matchers, SOURCE)
            .unwrap();
        assert_eq!(
            lines(&synthesis.matched),
            vec!["assertThat((Object) parsedJson.read(\"\\$.id\")).isNull()"]
        );
    }

    #[test]
    fn request_placeholders_resolve_in_residual_leaves() {
        let request = Request::new("POST")
            .with_url(Url::new("/users/7"))
            .with_body(BodyValue::from(json!({"age": 30})));
        let templates = RequestTemplateProcessor::new();
        let body = BodyValue::from(json!({
            "path": "{{{request.path}}}",
            "age": "{{{jsonPath request.body '$.age'}}}"
        }));
        let synthesis = JsonBodySynthesizer::new(java())
            .with_templates(&templates, &request)
            .synthesize(&body, &BodyMatchers::new(), SOURCE)
            .unwrap();
        assert_eq!(
            lines(&synthesis.residual),
            vec![
                "assertThatJson(parsedJson).field(\"['path']\").isEqualTo(\"/users/7\")",
                "assertThatJson(parsedJson).field(\"['age']\").isEqualTo(30)",
            ]
        );
    }

    #[test]
    fn text_bodies_holding_json_are_parsed() {
        let body = BodyValue::text("{\"id\":1}");
        assert_eq!(json_body(&body), Some(BodyValue::from(json!({"id": 1}))));
        assert_eq!(json_body(&BodyValue::text("plain")), None);
    }
}
