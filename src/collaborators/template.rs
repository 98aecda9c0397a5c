//! Response templating: placeholders that reference the request.
//!
//! A response value such as `{{{request.path}}}` is not a literal; the
//! generated test must compare against what the request actually sent.
//! [`RequestTemplateProcessor`] resolves such placeholders from the
//! contract's request at render time.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::jsonpath::JsonPath;
use crate::model::{BodyValue, NamedProperty, Request};

static TRIPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\{\s*([^{}]+?)\s*\}\}\}").expect("Invalid placeholder regex"));

static DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("Invalid placeholder regex"));

static JSON_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:jsonPath request\.body|jsonpath this) '([^']*)'$")
        .expect("Invalid jsonPath helper regex")
});

static INDEXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\.\[(\d+)\]$").expect("Invalid index regex"));

/// Rewrites rendered text whose values reference the request.
pub trait TemplateProcessor {
    /// Whether `text` holds at least one placeholder.
    fn contains_template_entry(&self, text: &str) -> bool;

    /// Resolves placeholders from `request`, passing every substituted
    /// value through `escape`. Placeholders that cannot be resolved are left
    /// as they are, so applying this twice is the same as applying it once.
    fn transform_with(
        &self,
        request: &Request,
        text: &str,
        escape: &dyn Fn(&str) -> String,
    ) -> String;

    /// Resolves placeholders, inserting values verbatim.
    fn transform(&self, request: &Request, text: &str) -> String {
        self.transform_with(request, text, &|value: &str| value.to_string())
    }
}

/// Resolves `request.url`, `request.path`, `request.path.[i]`,
/// `request.query.<k>`, `request.headers.<k>`, `request.cookies.<k>`,
/// `request.body` and `jsonPath request.body '<path>'`.
///
/// Triple braces insert the value as is; double braces HTML-escape it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTemplateProcessor;

impl RequestTemplateProcessor {
    pub fn new() -> Self {
        Self
    }

    fn resolve(&self, request: &Request, expression: &str) -> Option<String> {
        if let Some(caps) = JSON_PATH.captures(expression) {
            let body = request.body.as_ref()?;
            let body = match body {
                BodyValue::Scalar(_) => BodyValue::parse_json(body.as_text()?)?,
                other => other.clone(),
            };
            let value = JsonPath::parse(&caps[1]).ok()?.read(&body).ok()?;
            return Some(display(&value));
        }

        let (name, index) = match INDEXED.captures(expression) {
            Some(caps) => (caps.get(1)?.as_str(), caps[2].parse::<usize>().ok()?),
            None => (expression, 0),
        };
        match name {
            "request.url" => url(request),
            "request.path" if index == 0 && !expression.ends_with(']') => path(request),
            "request.path" => path(request)?
                .split('/')
                .filter(|segment| !segment.is_empty())
                .nth(index)
                .map(str::to_string),
            "request.body" => request.body.as_ref().map(display),
            _ => {
                let (properties, key) = if let Some(key) = name.strip_prefix("request.query.") {
                    (query(request), key)
                } else if let Some(key) = name.strip_prefix("request.headers.") {
                    (request.headers.as_slice(), key)
                } else if let Some(key) = name.strip_prefix("request.cookies.") {
                    (request.cookies.as_slice(), key)
                } else {
                    return None;
                };
                let values: Vec<&NamedProperty> = properties
                    .iter()
                    .filter(|p| p.name.eq_ignore_ascii_case(key))
                    .collect();
                values
                    .get(index)
                    .and_then(|p| p.value.test_side())
                    .map(display)
            }
        }
    }
}

impl TemplateProcessor for RequestTemplateProcessor {
    fn contains_template_entry(&self, text: &str) -> bool {
        TRIPLE.is_match(text) || DOUBLE.is_match(text)
    }

    fn transform_with(
        &self,
        request: &Request,
        text: &str,
        escape: &dyn Fn(&str) -> String,
    ) -> String {
        let text = TRIPLE.replace_all(text, |caps: &Captures<'_>| {
            match self.resolve(request, &caps[1]) {
                Some(value) => escape(&value),
                None => caps[0].to_string(),
            }
        });
        DOUBLE
            .replace_all(&text, |caps: &Captures<'_>| {
                match self.resolve(request, &caps[1]) {
                    Some(value) => escape(&html_escape(&value)),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn query(request: &Request) -> &[NamedProperty] {
    request
        .effective_url()
        .map(|url| url.query_parameters.as_slice())
        .unwrap_or(&[])
}

fn path(request: &Request) -> Option<String> {
    request
        .effective_url()
        .and_then(|url| url.value.as_text())
        .map(|text| text.split('?').next().unwrap_or(text).to_string())
}

fn url(request: &Request) -> Option<String> {
    let path = path(request)?;
    let pairs: Vec<String> = query(request)
        .iter()
        .filter_map(|p| p.value.test_side().map(|v| format!("{}={}", p.name, display(v))))
        .collect();
    if pairs.is_empty() {
        Some(path)
    } else {
        Some(format!("{}?{}", path, pairs.join("&")))
    }
}

fn display(value: &BodyValue) -> String {
    match value {
        BodyValue::Scalar(scalar) => scalar.display(),
        BodyValue::Regex(pattern) => pattern.clone(),
        BodyValue::FileRef(file) => file.as_string(),
        BodyValue::ComputedRef(command) => command.command().to_string(),
        other => other.to_json(),
    }
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            c => out.push(c),
        }
    }
    out
}

/// Whether `text` is a lone placeholder, e.g. a header value of `{{{request.path}}}`.
pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    find_placeholder_span(trimmed).map_or(false, |(start, end)| start == 0 && end == trimmed.len())
}

fn find_placeholder_span(text: &str) -> Option<(usize, usize)> {
    TRIPLE
        .find(text)
        .or_else(|| DOUBLE.find(text))
        .map(|m| (m.start(), m.end()))
}
