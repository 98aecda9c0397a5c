//! Facts derived once per contract and read by every fragment.

use crate::collaborators::naming;
use crate::model::{find_property, BodyValue, Contract, Header, Scalar};
use crate::RenderConfig;

/// Body content type as far as test generation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Json,
    Xml,
    Text,
    Form,
    /// A content type header that is neither JSON, XML, text nor form.
    Defined,
    /// No body, or nothing to go on.
    Unknown,
}

/// Which side of the interaction a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

/// A contract plus the facts every fragment predicate needs.
#[derive(Debug, Clone)]
pub struct SingleContractMetadata<'a> {
    pub contract: &'a Contract,
    method_name: String,
    input_content_type: ContentType,
    output_content_type: ContentType,
    ignored: bool,
}

impl<'a> SingleContractMetadata<'a> {
    pub fn new(contract: &'a Contract, config: &RenderConfig) -> Self {
        let (input_headers, input_body) = match (&contract.request, &contract.input) {
            (Some(request), _) => (request.headers.as_slice(), request.body.as_ref()),
            (None, Some(input)) => (input.headers.as_slice(), input.body.as_ref()),
            (None, None) => (&[][..], None),
        };
        let (output_headers, output_body) = match (&contract.response, &contract.output_message) {
            (Some(response), _) => (response.headers.as_slice(), response.body.as_ref()),
            (None, Some(output)) => (output.headers.as_slice(), output.body.as_ref()),
            (None, None) => (&[][..], None),
        };
        let ignored = contract.ignored
            || contract
                .name
                .as_ref()
                .map_or(false, |name| config.ignored_contracts.iter().any(|n| n == name));

        Self {
            contract,
            method_name: naming::method_name(contract),
            input_content_type: evaluate_content_type(input_headers, input_body),
            output_content_type: evaluate_content_type(output_headers, output_body),
            ignored,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn is_http(&self) -> bool {
        self.contract.request.is_some()
    }

    pub fn is_messaging(&self) -> bool {
        !self.is_http()
            && (self.contract.input.is_some() || self.contract.output_message.is_some())
    }

    pub fn is_json(&self) -> bool {
        self.input_content_type == ContentType::Json
            || self.output_content_type == ContentType::Json
    }

    pub fn is_xml(&self) -> bool {
        self.input_content_type == ContentType::Xml
            || self.output_content_type == ContentType::Xml
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn is_in_progress(&self) -> bool {
        self.contract.in_progress
    }

    pub fn is_ordered(&self) -> bool {
        self.contract.order.is_some()
    }

    pub fn input_content_type(&self) -> ContentType {
        self.input_content_type
    }

    pub fn output_content_type(&self) -> ContentType {
        self.output_content_type
    }

    /// Display name for logs.
    pub fn display_name(&self) -> &str {
        self.contract
            .name
            .as_deref()
            .unwrap_or(&self.contract.file_name)
    }
}

/// Decides the content type from the `Content-Type` header, falling back to
/// the shape of the body.
pub fn evaluate_content_type(headers: &[Header], body: Option<&BodyValue>) -> ContentType {
    let body = match body {
        Some(body) => body,
        None => return ContentType::Unknown,
    };
    let declared = find_property(headers, "Content-Type")
        .and_then(|header| header.value.test_side())
        .and_then(|value| match value {
            BodyValue::Scalar(scalar) => Some(scalar.display()),
            BodyValue::Regex(pattern) => Some(pattern.clone()),
            _ => None,
        });
    if let Some(declared) = declared {
        let declared = declared.to_ascii_lowercase();
        if declared.contains("json") {
            return ContentType::Json;
        }
        if declared.contains("xml") {
            return ContentType::Xml;
        }
        if declared.contains("x-www-form-urlencoded") {
            return ContentType::Form;
        }
        if declared.contains("text/plain") {
            return ContentType::Text;
        }
        return match content_type_from_body(body) {
            ContentType::Json => ContentType::Json,
            _ => ContentType::Defined,
        };
    }
    content_type_from_body(body)
}

fn content_type_from_body(body: &BodyValue) -> ContentType {
    match body {
        BodyValue::Mapping(_) | BodyValue::Sequence(_) => ContentType::Json,
        BodyValue::Scalar(Scalar::Text(text)) => content_type_from_text(text),
        BodyValue::Scalar(_) | BodyValue::Regex(_) => ContentType::Text,
        BodyValue::FileRef(file) => {
            let name = file.file_name.to_ascii_lowercase();
            if name.ends_with(".json") {
                ContentType::Json
            } else if name.ends_with(".xml") {
                ContentType::Xml
            } else if file.is_byte() {
                ContentType::Unknown
            } else {
                content_type_from_text(&file.as_string())
            }
        }
        BodyValue::ComputedRef(_) => ContentType::Unknown,
    }
}

fn content_type_from_text(text: &str) -> ContentType {
    let trimmed = text.trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
    {
        ContentType::Json
    } else if trimmed.starts_with('<') && roxmltree::Document::parse(text).is_ok() {
        ContentType::Xml
    } else {
        ContentType::Text
    }
}
