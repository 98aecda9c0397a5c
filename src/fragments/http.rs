//! Pieces shared by the HTTP harnesses: literals for request values and
//! the status, header and cookie then-lines.

use crate::emit::EmitBuffer;
use crate::metadata::{ContentType, Direction};
use crate::model::{BodyValue, NamedProperty, Request, Response, Scalar, Url};
use crate::syntax::AssertionSyntaxProfile;
use crate::{RenderError, RenderResult};

use super::MethodContext;

/// Literal for a header, cookie or query parameter value that is sent.
pub fn property_literal(profile: &AssertionSyntaxProfile, value: &BodyValue) -> String {
    match value {
        BodyValue::ComputedRef(command) => command.command().to_string(),
        BodyValue::Scalar(scalar) => profile.quoted(&scalar.display()),
        BodyValue::Regex(pattern) => profile.quoted(pattern),
        BodyValue::FileRef(file) => profile.quoted(&file.as_string()),
        other => profile.quoted(&other.to_json()),
    }
}

/// Entries that are sent or asserted, paired with their test-side value.
pub fn present(properties: &[NamedProperty]) -> impl Iterator<Item = (&str, &BodyValue)> {
    properties
        .iter()
        .filter_map(|p| p.value.test_side().map(|value| (p.name.as_str(), value)))
}

pub fn request<'a>(ctx: &MethodContext<'a>) -> RenderResult<&'a Request> {
    ctx.metadata
        .contract
        .request
        .as_ref()
        .ok_or_else(|| RenderError::malformed("HTTP contract has no request"))
}

pub fn response<'a>(ctx: &MethodContext<'a>) -> RenderResult<&'a Response> {
    ctx.metadata
        .contract
        .response
        .as_ref()
        .ok_or_else(|| RenderError::malformed("HTTP contract has no response"))
}

/// The request URL, or a malformed-contract error when neither `url` nor
/// `urlPath` is set.
pub fn url(request: &Request) -> RenderResult<&Url> {
    request
        .effective_url()
        .ok_or_else(|| RenderError::malformed("neither url nor urlPath is set on the request"))
}

/// URL literal: commands are inlined, everything else is quoted.
pub fn url_literal(profile: &AssertionSyntaxProfile, url: &Url) -> String {
    property_literal(profile, &url.value)
}

/// Literal for a request or input message body.
pub fn body_literal(
    ctx: &MethodContext<'_>,
    body: &BodyValue,
    content_type: ContentType,
) -> RenderResult<String> {
    let profile = &ctx.profile;
    Ok(match body {
        BodyValue::ComputedRef(command) => command.command().to_string(),
        BodyValue::FileRef(file) if file.is_byte() => {
            ctx.body_reader
                .bytes_expression(ctx.metadata, file, Direction::Request)?
        }
        BodyValue::FileRef(file) => {
            ctx.body_reader
                .string_expression(ctx.metadata, file, Direction::Request)?
        }
        BodyValue::Mapping(entries) if content_type == ContentType::Form => {
            let pairs: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}={}", key, form_value(value)))
                .collect();
            profile.quoted(&pairs.join("&"))
        }
        BodyValue::Mapping(_) | BodyValue::Sequence(_) => profile.quoted_long(&body.to_json()),
        BodyValue::Scalar(Scalar::Text(text)) if content_type == ContentType::Json => {
            profile.quoted_long(text)
        }
        BodyValue::Scalar(scalar) => profile.quoted(&scalar.display()),
        BodyValue::Regex(pattern) => profile.quoted(pattern),
    })
}

fn form_value(value: &BodyValue) -> String {
    match value {
        BodyValue::Scalar(scalar) => scalar.display(),
        BodyValue::Regex(pattern) => pattern.clone(),
        BodyValue::ComputedRef(command) => command.command().to_string(),
        BodyValue::FileRef(file) => file.as_string(),
        other => other.to_json(),
    }
}

/// Mime type used when the request carries no `Content-Type` header.
pub fn mime_type(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Json => "application/json",
        ContentType::Xml => "application/xml",
        ContentType::Text => "text/plain",
        ContentType::Form => "application/x-www-form-urlencoded",
        ContentType::Defined | ContentType::Unknown => "application/octet-stream",
    }
}

/// `assertThat(object)` against an expected header or cookie value. Header
/// values are strings, so scalars compare as quoted text.
pub fn assert_property(profile: &AssertionSyntaxProfile, object: &str, value: &BodyValue) -> String {
    match value {
        BodyValue::Scalar(scalar) => format!(
            "{}{}",
            profile.assert_that(object),
            profile.is_equal_to(&profile.quoted(&scalar.display()))
        ),
        other => profile.assert_value(object, other),
    }
}

pub fn status(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let response = response(ctx)?;
    let profile = &ctx.profile;
    let mut buffer = EmitBuffer::new();
    buffer.line_with_ending(format!(
        "{}{}",
        profile.assert_that(profile.status_accessor()),
        profile.is_equal_to(&response.status.to_string())
    ));
    Ok(buffer)
}

/// Not-null assertions first, then one comparison per header.
pub fn headers(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let response = response(ctx)?;
    let profile = &ctx.profile;
    let mut buffer = EmitBuffer::new();
    for (name, value) in present(&response.headers) {
        let accessor = profile.header_accessor(name);
        buffer.line_with_ending(profile.assert_not_null(&accessor));
        buffer.line_with_ending(assert_property(profile, &accessor, value));
    }
    Ok(buffer)
}

pub fn cookies(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let response = response(ctx)?;
    let profile = &ctx.profile;
    let mut buffer = EmitBuffer::new();
    for (name, value) in present(&response.cookies) {
        buffer.line_with_ending(profile.assert_not_null(&profile.cookie_accessor(name)));
        buffer.line_with_ending(assert_property(
            profile,
            &profile.cookie_value_accessor(name),
            value,
        ));
    }
    Ok(buffer)
}

pub fn has_present(properties: &[NamedProperty]) -> bool {
    present(properties).next().is_some()
}
