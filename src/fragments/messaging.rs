//! Messaging fragments: create and send the input message, or call the
//! triggering method, then receive the output message and verify it.

use crate::emit::EmitBuffer;
use crate::model::{BodyValue, Input, OutputMessage};
use crate::{RenderError, RenderResult};

use super::http::{body_literal, present, property_literal};
use super::MethodContext;

pub fn input<'a>(ctx: &MethodContext<'a>) -> Option<&'a Input> {
    ctx.metadata.contract.input.as_ref()
}

pub fn output<'a>(ctx: &MethodContext<'a>) -> Option<&'a OutputMessage> {
    ctx.metadata.contract.output_message.as_ref()
}

/// `given:` section creating `inputMessage` from the input body and headers.
pub fn given(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let input = input(ctx).ok_or_else(|| RenderError::malformed("contract has no input message"))?;
    let body = input
        .body
        .as_ref()
        .ok_or_else(|| RenderError::malformed("input message has no body"))?;
    let profile = &ctx.profile;

    let mut buffer = EmitBuffer::new();
    buffer.start_section("given:");
    buffer.line("ContractVerifierMessage inputMessage = contractVerifierMessaging.create(");
    buffer.indent();
    buffer.line(body_literal(ctx, body, ctx.metadata.input_content_type())?);
    buffer.line(", headers()");
    buffer.indent();
    for (name, value) in present(&input.headers) {
        buffer.line(format!(
            ".header({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    buffer.unindent();
    buffer.unindent();
    buffer.line_with_ending(")");
    buffer.close_block();
    Ok(buffer)
}

/// `when:` section calling the base class method that triggers the output.
pub fn trigger(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let method = input(ctx)
        .and_then(|input| input.triggered_by.as_deref())
        .ok_or_else(|| RenderError::malformed("input has no triggering method"))?;
    let mut buffer = EmitBuffer::new();
    buffer.start_section("when:");
    buffer.line_with_ending(method);
    buffer.close_block();
    Ok(buffer)
}

/// `when:` section sending `inputMessage` to its destination.
pub fn send(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let destination = input(ctx)
        .and_then(|input| input.message_from.as_deref())
        .ok_or_else(|| RenderError::malformed("input has no destination"))?;
    let mut buffer = EmitBuffer::new();
    buffer.start_section("when:");
    buffer.line_with_ending(format!(
        "contractVerifierMessaging.send(inputMessage, {})",
        ctx.profile.quoted(destination)
    ));
    buffer.close_block();
    Ok(buffer)
}

/// Receives the output message into `response` and checks it arrived.
pub fn receive(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let destination = output(ctx)
        .and_then(|output| output.sent_to.as_ref())
        .ok_or_else(|| RenderError::malformed("output message has no destination"))?;
    let destination = match destination {
        BodyValue::ComputedRef(command) => command.command().to_string(),
        other => property_literal(&ctx.profile, other),
    };
    let mut buffer = EmitBuffer::new();
    buffer.line_with_ending(format!(
        "ContractVerifierMessage response = contractVerifierMessaging.receive({})",
        destination
    ));
    buffer.line_with_ending(ctx.profile.assert_not_null("response"));
    Ok(buffer)
}

/// An `and:` section with one presence check and one comparison per header.
pub fn headers(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let output = output(ctx).ok_or_else(|| RenderError::malformed("contract has no output message"))?;
    let profile = &ctx.profile;
    let mut buffer = EmitBuffer::new();
    buffer.close_block().empty_line().start_section("and:");
    for (name, value) in present(&output.headers) {
        let accessor = profile.header_accessor(name);
        buffer.line_with_ending(profile.assert_not_null(&accessor));
        let line = match value {
            BodyValue::Scalar(scalar) => format!(
                "{}{}",
                profile.assert_that(&format!("{}.toString()", accessor)),
                profile.is_equal_to(&profile.quoted(&scalar.display()))
            ),
            BodyValue::Regex(pattern) => format!(
                "{}{}",
                profile.assert_that(&format!("{}.toString()", accessor)),
                profile.matches(pattern)
            ),
            other => profile.assert_value(&accessor, other),
        };
        buffer.line_with_ending(line);
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FsBodyReader, RequestTemplateProcessor};
    use crate::config::RenderConfig;
    use crate::metadata::SingleContractMetadata;
    use crate::model::Contract;

    fn with_ctx<T>(contract: &Contract, f: impl FnOnce(&MethodContext<'_>) -> T) -> T {
        let config = RenderConfig::junit5();
        let metadata = SingleContractMetadata::new(contract, &config);
        let reader = FsBodyReader::new(&config, "com.example");
        let templates = RequestTemplateProcessor::new();
        let ctx = MethodContext::new(&config, &metadata, &reader, &templates);
        f(&ctx)
    }

    #[test]
    fn input_message_is_created_with_headers() {
        let contract = Contract::messaging("book.yml").with_input(
            Input::from_destination("input")
                .with_header("sample", "header")
                .with_body(BodyValue::mapping([("bookName", BodyValue::text("foo"))])),
        );
        let rendered = with_ctx(&contract, |ctx| {
            let mut buffer = given(ctx)?;
            buffer.extend(send(ctx)?);
            buffer.render("    ", ";", "// ")
        })
        .unwrap();
        insta::assert_snapshot!(rendered, @r###"
        // given:
            ContractVerifierMessage inputMessage = contractVerifierMessaging.create(
                    "{\"bookName\":\"foo\"}"
                    , headers()
                            .header("sample", "header")
            );
        // when:
            contractVerifierMessaging.send(inputMessage, "input");
        "###);
    }

    #[test]
    fn output_is_received_and_headers_checked() {
        let contract = Contract::messaging("book.yml")
            .with_input(Input::triggered_by("bookReturnedTriggered()"))
            .with_output_message(
                OutputMessage::sent_to("activemq:output")
                    .with_header("BOOK-NAME", "foo")
                    .with_header("processId", BodyValue::regex("[0-9]+")),
            );
        let rendered = with_ctx(&contract, |ctx| {
            let mut buffer = trigger(ctx)?;
            buffer.start_section("then:");
            buffer.extend(receive(ctx)?);
            buffer.extend(headers(ctx)?);
            buffer.close_block();
            buffer.render("    ", ";", "// ")
        })
        .unwrap();
        insta::assert_snapshot!(rendered, @r###"
        // when:
            bookReturnedTriggered();
        // then:
            ContractVerifierMessage response = contractVerifierMessaging.receive("activemq:output");
            assertThat(response).isNotNull();

        // and:
            assertThat(response.getHeader("BOOK-NAME")).isNotNull();
            assertThat(response.getHeader("BOOK-NAME").toString()).isEqualTo("foo");
            assertThat(response.getHeader("processId")).isNotNull();
            assertThat(response.getHeader("processId").toString()).matches("[0-9]+");
        "###);
    }
}
