//! Response body verification, selected by what the expected body holds.

use crate::body::{binary_body, json_body, text_body, BodySynthesis, JsonBodySynthesizer, XmlBodySynthesizer};
use crate::emit::EmitBuffer;
use crate::metadata::{ContentType, Direction};
use crate::model::{BodyMatchers, BodyValue, FromFile};
use crate::{RenderError, RenderResult};

use super::{ExtensionPoint, Fragment, FragmentTable, MethodContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseBody {
    /// Byte fixtures compare as byte arrays.
    Binary,
    Text,
    Json,
    Xml,
}

pub static RESPONSE_BODY: FragmentTable<'static, ResponseBody> = FragmentTable::new(
    ExtensionPoint::ResponseBody,
    &[
        ResponseBody::Binary,
        ResponseBody::Text,
        ResponseBody::Json,
        ResponseBody::Xml,
    ],
);

/// The expected response or output message body and its matchers.
pub fn expected_body<'a>(ctx: &MethodContext<'a>) -> Option<(&'a BodyValue, &'a BodyMatchers)> {
    let contract = ctx.metadata.contract;
    match (&contract.response, &contract.output_message) {
        (Some(response), _) => response.body.as_ref().map(|body| (body, &response.matchers)),
        (None, Some(output)) => output.body.as_ref().map(|body| (body, &output.matchers)),
        (None, None) => None,
    }
}

fn byte_file(body: &BodyValue) -> Option<&FromFile> {
    match body {
        BodyValue::FileRef(file) if file.is_byte() => Some(file),
        _ => None,
    }
}

fn is_json(ctx: &MethodContext<'_>, body: &BodyValue) -> bool {
    json_body(body).is_some()
        && (ctx.metadata.output_content_type() == ContentType::Json
            || matches!(body, BodyValue::FileRef(_)))
}

fn is_xml(ctx: &MethodContext<'_>, body: &BodyValue) -> bool {
    ctx.metadata.output_content_type() == ContentType::Xml
        && matches!(body, BodyValue::Scalar(_) | BodyValue::FileRef(_))
}

impl Fragment<MethodContext<'_>> for ResponseBody {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        let (body, _) = match expected_body(ctx) {
            Some(expected) => expected,
            None => return false,
        };
        match self {
            ResponseBody::Binary => byte_file(body).is_some(),
            ResponseBody::Text => {
                byte_file(body).is_none() && !is_json(ctx, body) && !is_xml(ctx, body)
            }
            ResponseBody::Json => is_json(ctx, body),
            ResponseBody::Xml => is_xml(ctx, body),
        }
    }
}

impl ResponseBody {
    pub fn synthesize(&self, ctx: &MethodContext<'_>) -> RenderResult<BodySynthesis> {
        let (body, matchers) =
            expected_body(ctx).ok_or_else(|| RenderError::malformed("contract expects no body"))?;
        let profile = ctx.profile;
        let source = profile.response_as_string();
        match self {
            ResponseBody::Binary => {
                let file = byte_file(body)
                    .ok_or_else(|| RenderError::malformed("binary body is not a byte fixture"))?;
                let bytes = ctx
                    .body_reader
                    .bytes_expression(ctx.metadata, file, Direction::Response)?;
                Ok(binary_body(&profile, &bytes))
            }
            ResponseBody::Text => {
                let file_expression = match body {
                    BodyValue::FileRef(file) => Some(ctx.body_reader.string_expression(
                        ctx.metadata,
                        file,
                        Direction::Response,
                    )?),
                    _ => None,
                };
                Ok(text_body(&profile, source, body, file_expression.as_deref()))
            }
            ResponseBody::Json => {
                let mut synthesizer = JsonBodySynthesizer::new(profile)
                    .with_assert_json_size(ctx.config.assert_json_size);
                if let Some(request) = &ctx.metadata.contract.request {
                    synthesizer = synthesizer.with_templates(ctx.templates, request);
                }
                synthesizer.synthesize(body, matchers, source)
            }
            ResponseBody::Xml => XmlBodySynthesizer::new(profile).synthesize(body, matchers, source),
        }
    }

    /// Closes the current section and verifies the body in an `and:` section.
    pub fn render(&self, ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
        let synthesis = self.synthesize(ctx)?;
        let mut buffer = EmitBuffer::new();
        buffer.close_block().empty_line().start_section("and:");
        buffer.extend(synthesis.to_emit());
        Ok(buffer)
    }
}
