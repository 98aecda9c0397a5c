//! In-memory contract model.
//!
//! Contracts are built by an external parser and consumed read-only by the
//! renderers. The builder methods exist so callers (and tests) can assemble
//! contracts without a DSL.

mod body;
mod matchers;

pub use body::{java_double, BodyValue, ExecutionCommand, FileEncoding, FromFile, Scalar};
pub use matchers::{BodyMatcher, BodyMatchers, MatchingType};

/// One request/response or input/output message interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contract {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Source file the contract was parsed from, e.g. `shouldReturnUser.yml`.
    pub file_name: String,
    /// Position within a scenario; scenario contracts render in this order.
    pub order: Option<usize>,
    pub ignored: bool,
    pub in_progress: bool,
    pub request: Option<Request>,
    pub response: Option<Response>,
    pub input: Option<Input>,
    pub output_message: Option<OutputMessage>,
}

impl Contract {
    pub fn http(file_name: impl Into<String>, request: Request, response: Response) -> Self {
        Self {
            file_name: file_name.into(),
            request: Some(request),
            response: Some(response),
            ..Self::default()
        }
    }

    pub fn messaging(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn in_progress(mut self) -> Self {
        self.in_progress = true;
        self
    }

    pub fn with_input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output_message(mut self, output: OutputMessage) -> Self {
        self.output_message = Some(output);
        self
    }
}

/// Matching strategies a header, cookie or query parameter may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingStrategyKind {
    EqualTo,
    Contains,
    Matching,
    NotMatching,
    EqualToJson,
    EqualToXml,
    /// The entry must not be present; it is never sent nor asserted.
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchingStrategy {
    pub kind: MatchingStrategyKind,
    pub value: Option<BodyValue>,
}

impl MatchingStrategy {
    pub fn absent() -> Self {
        Self {
            kind: MatchingStrategyKind::Absent,
            value: None,
        }
    }

    pub fn new(kind: MatchingStrategyKind, value: BodyValue) -> Self {
        Self {
            kind,
            value: Some(value),
        }
    }
}

/// The value of a header, cookie or query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Value(BodyValue),
    Strategy(MatchingStrategy),
}

impl PropertyValue {
    /// The value the generated test uses; `None` for absent entries.
    pub fn test_side(&self) -> Option<&BodyValue> {
        match self {
            PropertyValue::Value(value) => Some(value),
            PropertyValue::Strategy(strategy) => match strategy.kind {
                MatchingStrategyKind::Absent => None,
                _ => strategy.value.as_ref(),
            },
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            PropertyValue::Strategy(MatchingStrategy {
                kind: MatchingStrategyKind::Absent,
                ..
            })
        )
    }
}

impl From<MatchingStrategy> for BodyValueOrStrategy {
    fn from(strategy: MatchingStrategy) -> Self {
        BodyValueOrStrategy(PropertyValue::Strategy(strategy))
    }
}

impl From<BodyValue> for BodyValueOrStrategy {
    fn from(value: BodyValue) -> Self {
        BodyValueOrStrategy(PropertyValue::Value(value))
    }
}

impl From<&str> for BodyValueOrStrategy {
    fn from(value: &str) -> Self {
        BodyValueOrStrategy(PropertyValue::Value(BodyValue::text(value)))
    }
}

/// Argument adapter for the `with_header`-style builders.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyValueOrStrategy(pub PropertyValue);

/// A named entry: header, cookie, query parameter or form parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedProperty {
    pub name: String,
    pub value: PropertyValue,
}

impl NamedProperty {
    pub fn new(name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        Self {
            name: name.into(),
            value: value.into().0,
        }
    }
}

pub type Header = NamedProperty;
pub type Cookie = NamedProperty;
pub type QueryParameter = NamedProperty;

/// Finds the first entry with the given name, ignoring ASCII case.
pub fn find_property<'a>(properties: &'a [NamedProperty], name: &str) -> Option<&'a NamedProperty> {
    properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// A request URL with its query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    /// Text, or a command producing the URL at test time.
    pub value: BodyValue,
    pub query_parameters: Vec<QueryParameter>,
}

impl Url {
    pub fn new(value: impl Into<BodyValue>) -> Self {
        Self {
            value: value.into(),
            query_parameters: Vec::new(),
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.query_parameters.push(NamedProperty::new(name, value));
        self
    }
}

/// One part of a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Param(BodyValue),
    File {
        file_name: Option<String>,
        content: BodyValue,
        content_type: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub method: String,
    pub url: Option<Url>,
    pub url_path: Option<Url>,
    pub headers: Vec<Header>,
    pub cookies: Vec<Cookie>,
    pub body: Option<BodyValue>,
    pub multipart: Vec<(String, MultipartPart)>,
    pub matchers: BodyMatchers,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<Url>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_url_path(mut self, url: impl Into<Url>) -> Self {
        self.url_path = Some(url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.headers.push(NamedProperty::new(name, value));
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.cookies.push(NamedProperty::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<BodyValue>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_part(mut self, name: impl Into<String>, part: MultipartPart) -> Self {
        self.multipart.push((name.into(), part));
        self
    }

    pub fn with_matcher(mut self, matcher: BodyMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// `url` when set, otherwise `url_path`.
    pub fn effective_url(&self) -> Option<&Url> {
        self.url.as_ref().or(self.url_path.as_ref())
    }
}

impl From<&str> for Url {
    fn from(value: &str) -> Self {
        Url::new(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<Header>,
    pub cookies: Vec<Cookie>,
    pub body: Option<BodyValue>,
    pub matchers: BodyMatchers,
    pub is_async: bool,
    /// Fixed delay in milliseconds; rendered as a timeout for async calls.
    pub delay_ms: Option<u64>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            cookies: Vec::new(),
            body: None,
            matchers: BodyMatchers::default(),
            is_async: false,
            delay_ms: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.headers.push(NamedProperty::new(name, value));
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.cookies.push(NamedProperty::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<BodyValue>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_matcher(mut self, matcher: BodyMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

/// The message (or method call) that triggers a messaging contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    /// Method invoked on the base class instead of sending a message.
    pub triggered_by: Option<String>,
    /// Destination the input message is sent to.
    pub message_from: Option<String>,
    pub headers: Vec<Header>,
    pub body: Option<BodyValue>,
    pub matchers: BodyMatchers,
}

impl Input {
    pub fn triggered_by(method: impl Into<String>) -> Self {
        Self {
            triggered_by: Some(method.into()),
            ..Self::default()
        }
    }

    pub fn from_destination(destination: impl Into<String>) -> Self {
        Self {
            message_from: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.headers.push(NamedProperty::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<BodyValue>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The message a messaging contract expects to be sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputMessage {
    /// Destination name, or a command resolving it at test time.
    pub sent_to: Option<BodyValue>,
    pub headers: Vec<Header>,
    pub body: Option<BodyValue>,
    pub matchers: BodyMatchers,
}

impl OutputMessage {
    pub fn sent_to(destination: impl Into<BodyValue>) -> Self {
        Self {
            sent_to: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<BodyValueOrStrategy>) -> Self {
        self.headers.push(NamedProperty::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<BodyValue>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_matcher(mut self, matcher: BodyMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }
}
