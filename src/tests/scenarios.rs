//! End-to-end scenarios: a body and its matchers, or a whole contract,
//! through synthesis or class rendering.

use serde_json::json;

use crate::body::JsonBodySynthesizer;
use crate::config::TargetLanguage;
use crate::model::{
    BodyMatcher, BodyMatchers, BodyValue, Contract, FromFile, MatchingStrategy, Request, Response,
};
use crate::syntax::{AssertionSyntaxProfile, Harness};
use crate::{render_class, AssertionKind, ContractGroup, RenderConfig};

const SOURCE: &str = "response.getBody().asString()";

fn synthesizer() -> JsonBodySynthesizer<'static> {
    JsonBodySynthesizer::new(AssertionSyntaxProfile::new(
        TargetLanguage::Java,
        Harness::RestAssured,
    ))
}

// ============ Body synthesis ============

#[test]
fn plain_fields_get_one_equality_each_in_order() {
    let body = BodyValue::from(json!({"id": 1, "name": "a"}));
    let synthesis = synthesizer()
        .synthesize(&body, &BodyMatchers::new(), SOURCE)
        .unwrap();

    let residual: Vec<(&str, AssertionKind)> = synthesis
        .residual
        .iter()
        .map(|a| (a.path.as_str(), a.kind))
        .collect();
    assert_eq!(
        residual,
        vec![
            ("$['id']", AssertionKind::Equality),
            ("$['name']", AssertionKind::Equality),
        ]
    );
    assert!(synthesis.matched.is_empty());
}

#[test]
fn type_matcher_with_minimum_replaces_item_equality() {
    let body = BodyValue::from(json!({"items": [1, 2, 3]}));
    let matchers = BodyMatchers::new().with(BodyMatcher::type_of("$.items[*]").with_min(1));
    let synthesis = synthesizer().synthesize(&body, &matchers, SOURCE).unwrap();

    assert!(synthesis.residual.is_empty());
    let kinds: Vec<AssertionKind> = synthesis.matched.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AssertionKind::Type, AssertionKind::Size]);
    assert!(synthesis.matched[1]
        .line
        .ends_with(".as(\"$.items[*]\").hasFlattenedSizeGreaterThanOrEqualTo(1)"));
}

#[test]
fn command_matcher_binds_to_the_path() {
    let body = BodyValue::from(json!({"id": "$value"}));
    let matchers =
        BodyMatchers::new().with(BodyMatcher::command("$.id", "assertThatValueIsANumber($it)"));
    let synthesis = synthesizer().synthesize(&body, &matchers, SOURCE).unwrap();

    assert!(synthesis.residual.is_empty());
    assert_eq!(synthesis.matched.len(), 1);
    assert_eq!(synthesis.matched[0].kind, AssertionKind::Command);
    assert_eq!(
        synthesis.matched[0].line,
        "assertThatValueIsANumber(parsedJson.read(\"$.id\"))"
    );
}

// ============ Whole contracts ============

#[test]
fn absent_headers_are_left_out_entirely() {
    let contract = Contract::http(
        "trace.yml",
        Request::new("GET")
            .with_url("/trace")
            .with_header("X-Trace", MatchingStrategy::absent())
            .with_header("Accept", "text/plain"),
        Response::new(200)
            .with_header("X-Trace", MatchingStrategy::absent())
            .with_header("X-Served-By", "edge"),
    );
    let group = ContractGroup::new("trace", vec![contract]);
    let rendered = render_class(&group, &RenderConfig::junit5()).unwrap();

    assert!(!rendered.contains("X-Trace"));
    assert!(rendered.contains(".header(\"Accept\", \"text/plain\");"));
    assert!(rendered.contains("assertThat(response.header(\"X-Served-By\")).isNotNull();"));
}

#[test]
fn byte_fixture_is_written_once_across_renders() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources");
    let resources = dir.path().join("resources");
    let config = RenderConfig::junit5()
        .with_package("com.example")
        .with_output_dirs(&sources, &resources);
    let contract = Contract::http(
        "download.yml",
        Request::new("GET").with_url("/image"),
        Response::new(200).with_body(BodyValue::FileRef(FromFile::bytes(
            "image.png",
            vec![0x89u8, b'P', b'N', b'G'],
        ))),
    );
    let group = ContractGroup::new("images", vec![contract]);

    let first = render_class(&group, &config).unwrap();
    let bytes_checks: Vec<&str> = first
        .lines()
        .filter(|line| line.contains("asByteArray()"))
        .collect();
    assert_eq!(bytes_checks.len(), 1);
    assert_eq!(
        bytes_checks[0].trim(),
        "assertThat(response.getBody().asByteArray()).isEqualTo(fileToBytes(this, \"validate_download_response_image.png\"));"
    );

    let fixture_dir = sources.join("com").join("example");
    let fixtures = || std::fs::read_dir(&fixture_dir).unwrap().count();
    assert_eq!(fixtures(), 1);
    assert_eq!(
        std::fs::read(fixture_dir.join("validate_download_response_image.png")).unwrap(),
        vec![0x89u8, b'P', b'N', b'G']
    );
    assert!(resources
        .join("com/example/validate_download_response_image.png")
        .exists());

    let second = render_class(&group, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(fixtures(), 1);
}

#[test]
fn missing_url_is_reported_as_malformed() {
    let contract = Contract::http("broken.yml", Request::new("GET"), Response::new(200));
    let group = ContractGroup::new("broken", vec![contract]);
    let err = render_class(&group, &RenderConfig::junit5()).unwrap_err();
    assert!(err
        .to_string()
        .contains("neither url nor urlPath is set on the request"));
}

#[test]
fn missing_matcher_path_reports_the_body() {
    let contract = Contract::http(
        "user.yml",
        Request::new("GET").with_url("/user"),
        Response::new(200)
            .with_body(BodyValue::from(json!({"id": 1})))
            .with_matcher(BodyMatcher::type_of("$.name")),
    );
    let group = ContractGroup::new("user", vec![contract]);
    let message = render_class(&group, &RenderConfig::junit5())
        .unwrap_err()
        .to_string();
    assert!(message.contains("$.name"));
    assert!(message.contains(r#"{"id":1}"#));
}

#[test]
fn in_progress_contracts_render_only_when_included() {
    let contract = Contract::http(
        "draft.yml",
        Request::new("GET").with_url("/draft"),
        Response::new(200),
    )
    .in_progress();
    let group = ContractGroup::new("drafts", vec![contract]);

    let skipped = render_class(&group, &RenderConfig::junit5()).unwrap();
    assert!(!skipped.contains("validate_draft"));

    let mut config = RenderConfig::junit5();
    config.include_in_progress = true;
    let included = render_class(&group, &config).unwrap();
    assert!(included.contains("public void validate_draft() throws Exception {"));
}

#[test]
fn echoed_request_values_are_escaped_for_the_dialect() {
    let contract = Contract::http(
        "echo.yml",
        Request::new("POST")
            .with_url("/echo")
            .with_header("X-Q", "say \"hi\" for $5")
            .with_body(BodyValue::from(json!({"name": "Ann"}))),
        Response::new(200)
            .with_header("X-Echo", "{{{request.headers.X-Q}}}")
            .with_header("X-Body", "{{{request.body}}}"),
    );
    let group = ContractGroup::new("echo", vec![contract]);

    let java = render_class(&group, &RenderConfig::junit5()).unwrap();
    assert!(java.contains(
        r#"assertThat(response.header("X-Echo")).isEqualTo("say \"hi\" for $5");"#
    ));
    assert!(java.contains(
        r#"assertThat(response.header("X-Body")).isEqualTo("{\"name\":\"Ann\"}");"#
    ));

    let groovy = render_class(&group, &RenderConfig::spock()).unwrap();
    assert!(groovy.contains(
        r#"assertThat(response.header("X-Echo")).isEqualTo("say \"hi\" for \$5")"#
    ));
    assert!(!groovy.contains("{{{"));
}
