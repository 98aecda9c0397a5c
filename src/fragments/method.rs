//! Method-level fragments: annotations, signature, processors and the
//! given/when/then stages.

use crate::assembler::{Span, TextAssembler};
use crate::config::{TargetLanguage, TestFramework, TestMode};
use crate::emit::EmitBuffer;
use crate::RenderResult;

use super::body::{expected_body, RESPONSE_BODY};
use super::{http, jaxrs, messaging, rest_assured};
use super::{ExtensionPoint, Fragment, FragmentTable, MethodContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodAnnotation {
    Test,
    Ignore,
}

pub static METHOD_ANNOTATIONS: FragmentTable<'static, MethodAnnotation> = FragmentTable::new(
    ExtensionPoint::MethodAnnotations,
    &[MethodAnnotation::Test, MethodAnnotation::Ignore],
);

impl Fragment<MethodContext<'_>> for MethodAnnotation {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        let framework = ctx.config.test_framework;
        match self {
            MethodAnnotation::Test => {
                matches!(framework, TestFramework::JUnit4 | TestFramework::JUnit5)
            }
            MethodAnnotation::Ignore => {
                framework != TestFramework::Custom && ctx.metadata.is_ignored()
            }
        }
    }
}

impl MethodAnnotation {
    pub fn annotation(&self, ctx: &MethodContext<'_>) -> &'static str {
        match (self, ctx.config.test_framework) {
            (MethodAnnotation::Test, _) => "@Test",
            (MethodAnnotation::Ignore, TestFramework::JUnit5) => "@Disabled",
            (MethodAnnotation::Ignore, _) => "@Ignore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSignature {
    Java,
    Groovy,
}

pub static METHOD_SIGNATURE: FragmentTable<'static, MethodSignature> = FragmentTable::new(
    ExtensionPoint::MethodSignature,
    &[MethodSignature::Java, MethodSignature::Groovy],
);

impl Fragment<MethodContext<'_>> for MethodSignature {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        match self {
            MethodSignature::Java => ctx.config.target_language == TargetLanguage::Java,
            MethodSignature::Groovy => ctx.config.target_language == TargetLanguage::Groovy,
        }
    }
}

impl MethodSignature {
    /// Declaration up to (not including) the opening brace.
    pub fn signature(&self, method_name: &str) -> String {
        match self {
            MethodSignature::Java => format!("public void {}() throws Exception ", method_name),
            MethodSignature::Groovy => format!("def {}() throws Exception ", method_name),
        }
    }
}

/// Runs before a method renders and may veto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreProcessor {
    InProgress,
}

pub static PRE_PROCESSORS: FragmentTable<'static, PreProcessor> = FragmentTable::new(
    ExtensionPoint::MethodPreProcessors,
    &[PreProcessor::InProgress],
);

impl Fragment<MethodContext<'_>> for PreProcessor {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        match self {
            PreProcessor::InProgress => ctx.metadata.is_in_progress(),
        }
    }
}

impl PreProcessor {
    pub fn vetoes(&self, ctx: &MethodContext<'_>) -> bool {
        match self {
            PreProcessor::InProgress => !ctx.config.include_in_progress,
        }
    }
}

/// Rewrites the text of a rendered method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessor {
    /// Resolves response placeholders that reference the request.
    Template,
}

pub static POST_PROCESSORS: FragmentTable<'static, PostProcessor> = FragmentTable::new(
    ExtensionPoint::MethodPostProcessors,
    &[PostProcessor::Template],
);

impl Fragment<MethodContext<'_>> for PostProcessor {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        match self {
            PostProcessor::Template => ctx.metadata.contract.request.is_some(),
        }
    }
}

impl PostProcessor {
    /// Rewrites `span` and returns the span of the new text.
    pub fn apply(
        &self,
        ctx: &MethodContext<'_>,
        assembler: &mut TextAssembler,
        span: Span,
    ) -> RenderResult<Span> {
        match self {
            PostProcessor::Template => {
                let request = match &ctx.metadata.contract.request {
                    Some(request) => request,
                    None => return Ok(span),
                };
                if !ctx.templates.contains_template_entry(assembler.span_text(span)) {
                    return Ok(span);
                }
                // Placeholders sit inside rendered string literals.
                let escape = |value: &str| ctx.profile.escape(value);
                assembler.rewrite_span(span, |text| {
                    ctx.templates.transform_with(request, text, &escape)
                })
            }
        }
    }
}

/// Setup stages; every accepting one renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Given {
    RestAssured,
    Messaging,
}

pub static GIVEN: FragmentTable<'static, Given> =
    FragmentTable::new(ExtensionPoint::Given, &[Given::RestAssured, Given::Messaging]);

impl Fragment<MethodContext<'_>> for Given {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        match self {
            Given::RestAssured => {
                ctx.metadata.is_http() && ctx.config.test_mode.is_rest_assured()
            }
            Given::Messaging => {
                ctx.metadata.is_messaging()
                    && messaging::input(ctx).map_or(false, |input| input.body.is_some())
            }
        }
    }
}

impl Given {
    pub fn render(&self, ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
        match self {
            Given::RestAssured => rest_assured::given(ctx),
            Given::Messaging => messaging::given(ctx),
        }
    }
}

/// The action under test; exactly one renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    RestAssured,
    JaxRs,
    MessagingTrigger,
    MessagingSend,
}

pub static WHEN: FragmentTable<'static, When> = FragmentTable::new(
    ExtensionPoint::When,
    &[
        When::RestAssured,
        When::JaxRs,
        When::MessagingTrigger,
        When::MessagingSend,
    ],
);

impl Fragment<MethodContext<'_>> for When {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        let input = messaging::input(ctx);
        match self {
            When::RestAssured => ctx.metadata.is_http() && ctx.config.test_mode.is_rest_assured(),
            When::JaxRs => {
                ctx.metadata.is_http() && ctx.config.test_mode == TestMode::JaxRsClient
            }
            When::MessagingTrigger => {
                ctx.metadata.is_messaging()
                    && input.map_or(false, |input| input.triggered_by.is_some())
            }
            When::MessagingSend => {
                ctx.metadata.is_messaging()
                    && input.map_or(false, |input| {
                        input.message_from.is_some() && input.body.is_some()
                    })
            }
        }
    }
}

impl When {
    pub fn render(&self, ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
        match self {
            When::RestAssured => rest_assured::when(ctx),
            When::JaxRs => jaxrs::when(ctx),
            When::MessagingTrigger => messaging::trigger(ctx),
            When::MessagingSend => messaging::send(ctx),
        }
    }
}

/// Verification stages, rendered inside one `then:` section in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Then {
    Status,
    Headers,
    Cookies,
    MessageReceived,
    MessageHeaders,
    Body,
}

pub static THEN: FragmentTable<'static, Then> = FragmentTable::new(
    ExtensionPoint::Then,
    &[
        Then::Status,
        Then::Headers,
        Then::Cookies,
        Then::MessageReceived,
        Then::MessageHeaders,
        Then::Body,
    ],
);

impl Fragment<MethodContext<'_>> for Then {
    fn accepts(&self, ctx: &MethodContext<'_>) -> bool {
        let contract = ctx.metadata.contract;
        let received = ctx.metadata.is_messaging()
            && messaging::output(ctx).map_or(false, |output| output.sent_to.is_some());
        match self {
            Then::Status => contract.response.is_some(),
            Then::Headers => contract
                .response
                .as_ref()
                .map_or(false, |response| http::has_present(&response.headers)),
            Then::Cookies => contract
                .response
                .as_ref()
                .map_or(false, |response| http::has_present(&response.cookies)),
            Then::MessageReceived => received,
            Then::MessageHeaders => {
                received
                    && messaging::output(ctx)
                        .map_or(false, |output| http::has_present(&output.headers))
            }
            Then::Body => {
                (ctx.metadata.is_http() || received) && expected_body(ctx).is_some()
            }
        }
    }
}

impl Then {
    pub fn render(&self, ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
        match self {
            Then::Status => http::status(ctx),
            Then::Headers => http::headers(ctx),
            Then::Cookies => http::cookies(ctx),
            Then::MessageReceived => messaging::receive(ctx),
            Then::MessageHeaders => messaging::headers(ctx),
            Then::Body => RESPONSE_BODY.select_one(ctx)?.render(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FsBodyReader, RequestTemplateProcessor};
    use crate::config::RenderConfig;
    use crate::metadata::SingleContractMetadata;
    use crate::model::{Contract, Input, OutputMessage, Request, Response};
    use crate::RenderError;

    fn with_ctx<T>(
        config: &RenderConfig,
        contract: &Contract,
        f: impl FnOnce(&MethodContext<'_>) -> T,
    ) -> T {
        let metadata = SingleContractMetadata::new(contract, config);
        let reader = FsBodyReader::new(config, "com.example");
        let templates = RequestTemplateProcessor::new();
        let ctx = MethodContext::new(config, &metadata, &reader, &templates);
        f(&ctx)
    }

    fn http_contract() -> Contract {
        Contract::http(
            "ping.yml",
            Request::new("GET").with_url("/ping"),
            Response::new(200),
        )
    }

    #[test]
    fn ignored_contracts_get_the_dialect_annotation() {
        let contract = http_contract().ignored();
        for (config, expected) in [
            (RenderConfig::junit4(), vec!["@Test", "@Ignore"]),
            (RenderConfig::junit5(), vec!["@Test", "@Disabled"]),
            (RenderConfig::spock(), vec!["@Ignore"]),
            (RenderConfig::custom(), vec![]),
        ] {
            let annotations: Vec<&str> = with_ctx(&config, &contract, |ctx| {
                METHOD_ANNOTATIONS
                    .select_all(ctx)
                    .into_iter()
                    .map(|a| a.annotation(ctx))
                    .collect()
            });
            assert_eq!(annotations, expected);
        }
    }

    #[test]
    fn in_progress_contracts_are_vetoed_unless_included() {
        let contract = http_contract().in_progress();
        let vetoed = with_ctx(&RenderConfig::junit5(), &contract, |ctx| {
            PRE_PROCESSORS.select_all(ctx).iter().any(|p| p.vetoes(ctx))
        });
        assert!(vetoed);

        let mut config = RenderConfig::junit5();
        config.include_in_progress = true;
        let vetoed = with_ctx(&config, &contract, |ctx| {
            PRE_PROCESSORS.select_all(ctx).iter().any(|p| p.vetoes(ctx))
        });
        assert!(!vetoed);
    }

    #[test]
    fn stages_follow_the_contract_kind() {
        let http = http_contract();
        let (givens, when, thens) = with_ctx(&RenderConfig::junit5(), &http, |ctx| {
            (
                GIVEN.select_all(ctx),
                WHEN.select_one(ctx).unwrap(),
                THEN.select_all(ctx),
            )
        });
        assert_eq!(givens, vec![&Given::RestAssured]);
        assert_eq!(when, &When::RestAssured);
        assert_eq!(thens, vec![&Then::Status]);

        let message = Contract::messaging("m.yml")
            .with_input(Input::triggered_by("trigger()"))
            .with_output_message(OutputMessage::sent_to("out").with_body("done"));
        let (givens, when, thens) = with_ctx(&RenderConfig::junit5(), &message, |ctx| {
            (
                GIVEN.select_all(ctx),
                WHEN.select_one(ctx).unwrap(),
                THEN.select_all(ctx),
            )
        });
        assert!(givens.is_empty());
        assert_eq!(when, &When::MessagingTrigger);
        assert_eq!(thens, vec![&Then::MessageReceived, &Then::Body]);
    }

    #[test]
    fn messaging_without_an_action_exhausts_the_when_point() {
        let message =
            Contract::messaging("m.yml").with_output_message(OutputMessage::sent_to("out"));
        let err = with_ctx(&RenderConfig::junit5(), &message, |ctx| {
            WHEN.select_one(ctx).map(|_| ())
        })
        .unwrap_err();
        assert!(matches!(err, RenderError::ConfigurationExhaustion { point: "when" }));
    }

    #[test]
    fn template_post_processor_rewrites_only_its_span() {
        let contract = Contract::http(
            "echo.yml",
            Request::new("GET").with_url("/users/7"),
            Response::new(200),
        );
        let mut assembler = TextAssembler::new("\t");
        assembler.add_line("before {{{request.path}}}");
        let start = assembler.len();
        assembler.add_line("assertThat(x).isEqualTo(\"{{{request.path}}}\")");
        let span = assembler.span_from(start);

        let span = with_ctx(&RenderConfig::junit5(), &contract, |ctx| {
            POST_PROCESSORS.select_all(ctx)[0].apply(ctx, &mut assembler, span)
        })
        .unwrap();
        assert_eq!(
            assembler.span_text(span),
            "assertThat(x).isEqualTo(\"/users/7\")\n"
        );
        assert!(assembler.as_str().starts_with("before {{{request.path}}}\n"));
    }
}
