//! One test method per contract.

use tracing::debug;

use crate::assembler::{Span, TextAssembler};
use crate::collaborators::{BodyReader, TemplateProcessor};
use crate::config::RenderConfig;
use crate::emit::EmitBuffer;
use crate::fragments::method::{
    GIVEN, METHOD_ANNOTATIONS, METHOD_SIGNATURE, POST_PROCESSORS, PRE_PROCESSORS, THEN, WHEN,
};
use crate::fragments::MethodContext;
use crate::metadata::SingleContractMetadata;
use crate::RenderResult;

/// Renders contracts into test methods.
///
/// A method goes through: pre-processors (which may skip it), a separating
/// empty line, annotations, signature, the `given:`/`when:`/`then:` stages inside braces, and
/// finally post-processors, which may rewrite the method's own text only.
pub struct MethodRenderer<'a> {
    config: &'a RenderConfig,
    body_reader: &'a dyn BodyReader,
    templates: &'a dyn TemplateProcessor,
}

impl<'a> MethodRenderer<'a> {
    pub fn new(
        config: &'a RenderConfig,
        body_reader: &'a dyn BodyReader,
        templates: &'a dyn TemplateProcessor,
    ) -> Self {
        Self {
            config,
            body_reader,
            templates,
        }
    }

    /// Appends the method to `assembler` and returns its span, or `None`
    /// when a pre-processor vetoed the contract.
    pub fn render(
        &self,
        metadata: &SingleContractMetadata<'_>,
        assembler: &mut TextAssembler,
    ) -> RenderResult<Option<Span>> {
        let ctx = MethodContext::new(self.config, metadata, self.body_reader, self.templates);
        let buffer = match self.emit(&ctx)? {
            Some(buffer) => buffer,
            None => return Ok(None),
        };
        buffer.check_balance()?;

        let start = assembler.len();
        buffer.flatten_into(assembler)?;
        let mut span = assembler.span_from(start);
        for processor in POST_PROCESSORS.select_all(&ctx) {
            span = processor.apply(&ctx, assembler, span)?;
        }
        Ok(Some(span))
    }

    /// Records the method as emit instructions.
    pub fn emit(&self, ctx: &MethodContext<'_>) -> RenderResult<Option<EmitBuffer>> {
        if let Some(processor) = PRE_PROCESSORS
            .select_all(ctx)
            .into_iter()
            .find(|processor| processor.vetoes(ctx))
        {
            debug!(
                contract = ctx.metadata.display_name(),
                processor = ?processor,
                "contract skipped by pre-processor"
            );
            return Ok(None);
        }

        let mut buffer = EmitBuffer::new();
        buffer.empty_line();
        for annotation in METHOD_ANNOTATIONS.select_all(ctx) {
            buffer.line(annotation.annotation(ctx));
        }
        let signature = METHOD_SIGNATURE.select_one(ctx)?;
        buffer.indented(signature.signature(ctx.metadata.method_name()));
        buffer.wrap_in_braces(|body| {
            for given in GIVEN.select_all(ctx) {
                body.extend(given.render(ctx)?);
                body.empty_line();
            }
            body.extend(WHEN.select_one(ctx)?.render(ctx)?);

            let thens = THEN.select_all(ctx);
            if !thens.is_empty() {
                body.empty_line().start_section("then:");
                for then in thens {
                    body.extend(then.render(ctx)?);
                }
                body.close_block();
            }
            Ok(())
        })?;
        Ok(Some(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FsBodyReader, RequestTemplateProcessor};
    use crate::model::{BodyMatcher, BodyValue, Contract, Request, Response};

    fn render(config: &RenderConfig, contract: &Contract) -> RenderResult<String> {
        let metadata = SingleContractMetadata::new(contract, config);
        let reader = FsBodyReader::new(config, "com.example");
        let templates = RequestTemplateProcessor::new();
        let renderer = MethodRenderer::new(config, &reader, &templates);
        let mut assembler = TextAssembler::new("    ")
            .with_line_ending(config.target_language.line_ending())
            .with_label_prefix(config.target_language.label_prefix());
        renderer.render(&metadata, &mut assembler)?;
        let rendered = assembler.into_string()?;
        Ok(rendered.trim_start_matches('\n').to_string())
    }

    #[test]
    fn full_http_method() {
        let contract = Contract::http(
            "shouldMarkClientAsFraud.yml",
            Request::new("PUT")
                .with_url("/fraudcheck")
                .with_header("Content-Type", "application/vnd.fraud.v1+json")
                .with_body(BodyValue::mapping([
                    ("clientId", BodyValue::text("1234567890")),
                    ("loanAmount", BodyValue::int(99999)),
                ])),
            Response::new(200)
                .with_header("Content-Type", BodyValue::regex("application/vnd.fraud.v1.json.*"))
                .with_body(BodyValue::mapping([
                    ("fraudCheckStatus", BodyValue::text("FRAUD")),
                    ("rejection.reason", BodyValue::text("Amount too high")),
                ]))
                .with_matcher(BodyMatcher::regex("$.fraudCheckStatus", "[A-Z]{5}")),
        );
        insta::assert_snapshot!(render(&RenderConfig::junit5(), &contract).unwrap(), @r###"
        @Test
        public void validate_shouldMarkClientAsFraud() throws Exception {
            // given:
                MockMvcRequestSpecification request = given()
                        .header("Content-Type", "application/vnd.fraud.v1+json")
                        .body("{\"clientId\":\"1234567890\",\"loanAmount\":99999}");

            // when:
                ResponseOptions response = given().spec(request)
                        .put("/fraudcheck");

            // then:
                assertThat(response.statusCode()).isEqualTo(200);
                assertThat(response.header("Content-Type")).isNotNull();
                assertThat(response.header("Content-Type")).matches("application/vnd.fraud.v1.json.*");

            // and:
                DocumentContext parsedJson = JsonPath.parse(response.getBody().asString());
                assertThatJson(parsedJson).field("['rejection.reason']").isEqualTo("Amount too high");

            // and:
                assertThat(parsedJson.read("$.fraudCheckStatus", String.class)).matches("[A-Z]{5}");
        }
        "###);
    }

    #[test]
    fn spock_methods_use_live_labels() {
        let contract = Contract::http(
            "ping.yml",
            Request::new("GET").with_url("/ping"),
            Response::new(200).with_body("pong"),
        )
        .ignored();
        insta::assert_snapshot!(render(&RenderConfig::spock(), &contract).unwrap(), @r###"
        @Ignore
        def validate_ping() throws Exception {
            given:
                MockMvcRequestSpecification request = given()

            when:
                ResponseOptions response = given().spec(request)
                        .get("/ping")

            then:
                assertThat(response.statusCode()).isEqualTo(200)

            and:
                String responseBody = response.getBody().asString()
                assertThat(responseBody).isEqualTo("pong")
        }
        "###);
    }

    #[test]
    fn vetoed_contracts_render_nothing() {
        let contract = Contract::http(
            "wip.yml",
            Request::new("GET").with_url("/wip"),
            Response::new(200),
        )
        .in_progress();
        assert_eq!(render(&RenderConfig::junit5(), &contract).unwrap(), "");
    }

    #[test]
    fn request_placeholders_are_resolved_after_rendering() {
        let contract = Contract::http(
            "echo.yml",
            Request::new("GET").with_url("/users/7"),
            Response::new(200).with_header("Location", "{{{request.path}}}"),
        );
        let rendered = render(&RenderConfig::junit5(), &contract).unwrap();
        assert!(rendered.contains(
            "assertThat(response.header(\"Location\")).isEqualTo(\"/users/7\");"
        ));
        assert!(!rendered.contains("{{{"));
    }
}
