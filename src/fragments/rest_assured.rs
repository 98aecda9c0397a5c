//! Rest Assured given/when fragments (MockMvc, explicit and WebTestClient).

use crate::config::TestMode;
use crate::emit::EmitBuffer;
use crate::metadata::Direction;
use crate::model::{BodyValue, MultipartPart};
use crate::{RenderError, RenderResult};

use super::http::{self, body_literal, present, property_literal};
use super::{ExtensionPoint, Fragment, FragmentTable, MethodContext};

/// The statement building the request specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSpecification {
    MockMvc,
    Explicit,
    WebTestClient,
}

pub static REQUEST_SPECIFICATION: FragmentTable<'static, RequestSpecification> = FragmentTable::new(
    ExtensionPoint::RequestSpecification,
    &[
        RequestSpecification::MockMvc,
        RequestSpecification::Explicit,
        RequestSpecification::WebTestClient,
    ],
);

impl Fragment<MethodContext<'_>> for RequestSpecification {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        let mode = ctx.config.test_mode;
        match self {
            RequestSpecification::MockMvc => mode == TestMode::MockMvc,
            RequestSpecification::Explicit => mode == TestMode::Explicit,
            RequestSpecification::WebTestClient => mode == TestMode::WebTestClient,
        }
    }
}

impl RequestSpecification {
    pub fn statement(&self) -> &'static str {
        match self {
            RequestSpecification::MockMvc => "MockMvcRequestSpecification request = given()",
            RequestSpecification::Explicit => "RequestSpecification request = given()",
            RequestSpecification::WebTestClient => {
                "WebTestClientRequestSpecification request = given()"
            }
        }
    }
}

/// The statement sending the request and binding the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestIssue {
    MockMvc,
    Explicit,
    WebTestClient,
}

pub static REQUEST_ISSUE: FragmentTable<'static, RequestIssue> = FragmentTable::new(
    ExtensionPoint::RequestIssue,
    &[
        RequestIssue::MockMvc,
        RequestIssue::Explicit,
        RequestIssue::WebTestClient,
    ],
);

impl Fragment<MethodContext<'_>> for RequestIssue {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        let mode = ctx.config.test_mode;
        match self {
            RequestIssue::MockMvc => mode == TestMode::MockMvc,
            RequestIssue::Explicit => mode == TestMode::Explicit,
            RequestIssue::WebTestClient => mode == TestMode::WebTestClient,
        }
    }
}

impl RequestIssue {
    pub fn statement(&self) -> &'static str {
        match self {
            RequestIssue::MockMvc => "ResponseOptions response = given().spec(request)",
            RequestIssue::Explicit => "Response response = given().spec(request)",
            RequestIssue::WebTestClient => "WebTestClientResponse response = given().spec(request)",
        }
    }
}

/// `given:` section: the request specification with its headers, cookies,
/// body and multipart parts chained on.
pub fn given(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let request = http::request(ctx)?;
    let profile = &ctx.profile;
    let specification = REQUEST_SPECIFICATION.select_one(ctx)?;

    let mut links = Vec::new();
    for (name, value) in present(&request.headers) {
        links.push(format!(
            ".header({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    for (name, value) in present(&request.cookies) {
        links.push(format!(
            ".cookie({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    if let Some(body) = &request.body {
        links.push(format!(
            ".body({})",
            body_literal(ctx, body, ctx.metadata.input_content_type())?
        ));
    }
    for (name, part) in &request.multipart {
        links.push(multipart_link(ctx, name, part)?);
    }

    let mut buffer = EmitBuffer::new();
    buffer.start_section("given:");
    buffer.chain(specification.statement(), &links);
    buffer.close_block();
    Ok(buffer)
}

fn multipart_link(ctx: &MethodContext<'_>, name: &str, part: &MultipartPart) -> RenderResult<String> {
    let profile = &ctx.profile;
    match part {
        MultipartPart::Param(value) => Ok(format!(
            ".param({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        )),
        MultipartPart::File {
            file_name,
            content,
            content_type,
        } => {
            let bytes = match content {
                BodyValue::FileRef(file) => {
                    ctx.body_reader
                        .bytes_expression(ctx.metadata, file, Direction::Request)?
                }
                other => format!("{}.getBytes()", property_literal(profile, other)),
            };
            let file_name = file_name.as_deref().unwrap_or(name);
            Ok(match content_type {
                Some(content_type) => format!(
                    ".multiPart({}, {}, {}, {})",
                    profile.quoted(name),
                    profile.quoted(file_name),
                    bytes,
                    profile.quoted(content_type)
                ),
                None => format!(
                    ".multiPart({}, {}, {})",
                    profile.quoted(name),
                    profile.quoted(file_name),
                    bytes
                ),
            })
        }
    }
}

/// `when:` section: query parameters, async handling and the call itself.
pub fn when(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let request = http::request(ctx)?;
    let response = http::response(ctx)?;
    let profile = &ctx.profile;
    let issue = REQUEST_ISSUE.select_one(ctx)?;
    let url = http::url(request)?;
    if request.method.trim().is_empty() {
        return Err(RenderError::malformed("request method is not set"));
    }

    let mut links = Vec::new();
    for (name, value) in present(&url.query_parameters) {
        links.push(format!(
            ".queryParam({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    if response.is_async {
        links.push(".when().async()".to_string());
    }
    if let Some(delay) = response.delay_ms {
        links.push(format!(".timeout({})", delay));
    }
    links.push(format!(
        ".{}({})",
        request.method.trim().to_ascii_lowercase(),
        http::url_literal(profile, url)
    ));

    let mut buffer = EmitBuffer::new();
    buffer.start_section("when:");
    buffer.chain(issue.statement(), &links);
    buffer.close_block();
    Ok(buffer)
}
