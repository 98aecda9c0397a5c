//! Whole-class rendering across dialects and harnesses.

use crate::config::{RenderConfig, TargetLanguage, TestFramework, TestMode};
use crate::model::{BodyValue, Contract, Input, OutputMessage, Request, Response};
use crate::{render_class, ContractGroup, RenderError};

fn config() -> RenderConfig {
    RenderConfig::junit5()
        .with_package("com.example")
        .with_indent_unit("    ")
}

fn get_user() -> Contract {
    Contract::http(
        "getUser.yml",
        Request::new("GET").with_url("/users/1"),
        Response::new(200)
            .with_header("Content-Type", "application/json")
            .with_body(BodyValue::mapping([
                ("id", BodyValue::int(1)),
                ("name", BodyValue::text("a")),
            ])),
    )
}

// ============ JUnit 5 ============

#[test]
fn junit5_mockmvc_class() {
    let config = config().with_base_class("com.example.base.FraudBase");
    let group = ContractGroup::new("fraud", vec![get_user()]);
    insta::assert_snapshot!(render_class(&group, &config).unwrap(), @r###"
    package com.example;

    import com.example.base.FraudBase;
    import com.jayway.jsonpath.DocumentContext;
    import com.jayway.jsonpath.JsonPath;
    import org.junit.jupiter.api.Test;
    import io.restassured.module.mockmvc.specification.MockMvcRequestSpecification;
    import io.restassured.response.ResponseOptions;

    import static org.springframework.cloud.contract.verifier.assertion.SpringCloudContractAssertions.assertThat;
    import static org.springframework.cloud.contract.verifier.util.ContractVerifierUtil.*;
    import static com.toomuchcoding.jsonassert.JsonAssertion.assertThatJson;
    import static io.restassured.module.mockmvc.RestAssuredMockMvc.*;

    @SuppressWarnings("rawtypes")
    public class FraudTest extends FraudBase {

        @Test
        public void validate_getUser() throws Exception {
            // given:
                MockMvcRequestSpecification request = given();

            // when:
                ResponseOptions response = given().spec(request)
                        .get("/users/1");

            // then:
                assertThat(response.statusCode()).isEqualTo(200);
                assertThat(response.header("Content-Type")).isNotNull();
                assertThat(response.header("Content-Type")).isEqualTo("application/json");

            // and:
                DocumentContext parsedJson = JsonPath.parse(response.getBody().asString());
                assertThatJson(parsedJson).field("['id']").isEqualTo(1);
                assertThatJson(parsedJson).field("['name']").isEqualTo("a");
        }

    }
    "###);
}

#[test]
fn base_classes_in_the_same_package_are_not_imported() {
    let config = config().with_base_class("com.example.FraudBase");
    let group = ContractGroup::new("fraud", vec![get_user()]);
    let rendered = render_class(&group, &config).unwrap();
    assert!(!rendered.contains("import com.example.FraudBase;"));
    assert!(rendered.contains("public class FraudTest extends FraudBase {"));
}

#[test]
fn ignored_contracts_and_rules_under_junit4() {
    let mut config = config()
        .with_framework(TestFramework::JUnit4)
        .with_mode(TestMode::Explicit);
    config.rule_class_for_tests = Some("org.example.SpringRule".into());
    let group = ContractGroup::new("users/v1", vec![get_user().ignored()]);
    let rendered = render_class(&group, &config).unwrap();

    assert!(rendered.starts_with("package com.example.users;\n"));
    assert!(rendered.contains("public class V1Test {"));
    for import in [
        "import org.junit.Test;",
        "import org.junit.Rule;",
        "import org.example.SpringRule;",
        "import org.junit.Ignore;",
        "import io.restassured.specification.RequestSpecification;",
        "import static io.restassured.RestAssured.*;",
    ] {
        assert!(rendered.contains(import), "missing {}", import);
    }
    assert!(rendered.contains("    @Rule public SpringRule rule = new SpringRule();\n"));
    assert!(rendered.contains("    @Test\n    @Ignore\n    public void validate_getUser()"));
    assert!(rendered.contains("Response response = given().spec(request)"));
}

#[test]
fn custom_framework_renders_no_framework_annotations() {
    let config = config().with_framework(TestFramework::Custom);
    let group = ContractGroup::new("fraud", vec![get_user().ignored()]);
    let rendered = render_class(&group, &config).unwrap();
    assert!(!rendered.contains("@Test"));
    assert!(!rendered.contains("@Disabled"));
    assert!(!rendered.contains("org.junit"));
    assert!(rendered.contains("public void validate_getUser() throws Exception {"));
}

// ============ Spock ============

#[test]
fn spock_specification() {
    let config = RenderConfig::spock()
        .with_package("com.example")
        .with_indent_unit("    ");
    let contract = Contract::http(
        "ping.yml",
        Request::new("GET").with_url("/ping"),
        Response::new(200).with_body("pong"),
    );
    let group = ContractGroup::new("ping", vec![contract]);
    insta::assert_snapshot!(render_class(&group, &config).unwrap(), @r###"
    package com.example

    import spock.lang.Specification
    import io.restassured.module.mockmvc.specification.MockMvcRequestSpecification
    import io.restassured.response.ResponseOptions

    import static org.springframework.cloud.contract.verifier.assertion.SpringCloudContractAssertions.assertThat
    import static org.springframework.cloud.contract.verifier.util.ContractVerifierUtil.*
    import static io.restassured.module.mockmvc.RestAssuredMockMvc.*

    class PingSpec extends Specification {

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

    }
    "###);
}

#[test]
fn spock_scenarios_are_stepwise() {
    let config = RenderConfig::spock().with_package("com.example");
    let group = ContractGroup::new(
        "scenario",
        vec![get_user().with_order(1), get_user().with_order(0)],
    );
    let rendered = render_class(&group, &config).unwrap();
    assert!(rendered.contains("import spock.lang.Stepwise\n"));
    assert!(rendered.contains("@Stepwise\nclass ScenarioSpec extends Specification {"));
    let first = rendered.find("validate_getUser_0").unwrap();
    let second = rendered.find("validate_getUser_1").unwrap();
    assert!(first < second);
}

// ============ Messaging ============

#[test]
fn messaging_class() {
    let contract = Contract::messaging("shouldSendBook.yml")
        .with_input(Input::triggered_by("bookReturnedTriggered()"))
        .with_output_message(
            OutputMessage::sent_to("activemq:output")
                .with_header("BOOK-NAME", "foo")
                .with_body(BodyValue::mapping([("bookName", BodyValue::text("foo"))])),
        );
    let group = ContractGroup::new("messaging/books", vec![contract]);
    insta::assert_snapshot!(render_class(&group, &config()).unwrap(), @r###"
    package com.example.messaging;

    import com.jayway.jsonpath.DocumentContext;
    import com.jayway.jsonpath.JsonPath;
    import org.junit.jupiter.api.Test;
    import javax.inject.Inject;
    import org.springframework.cloud.contract.verifier.messaging.internal.ContractVerifierObjectMapper;
    import org.springframework.cloud.contract.verifier.messaging.internal.ContractVerifierMessage;
    import org.springframework.cloud.contract.verifier.messaging.internal.ContractVerifierMessaging;

    import static org.springframework.cloud.contract.verifier.assertion.SpringCloudContractAssertions.assertThat;
    import static org.springframework.cloud.contract.verifier.util.ContractVerifierUtil.*;
    import static com.toomuchcoding.jsonassert.JsonAssertion.assertThatJson;
    import static org.springframework.cloud.contract.verifier.messaging.util.ContractVerifierMessagingUtil.headers;

    @SuppressWarnings("rawtypes")
    public class BooksTest {
        @Inject ContractVerifierMessaging contractVerifierMessaging;
        @Inject ContractVerifierObjectMapper contractVerifierObjectMapper;

        @Test
        public void validate_shouldSendBook() throws Exception {
            // when:
                bookReturnedTriggered();

            // then:
                ContractVerifierMessage response = contractVerifierMessaging.receive("activemq:output");
                assertThat(response).isNotNull();

            // and:
                assertThat(response.getHeader("BOOK-NAME")).isNotNull();
                assertThat(response.getHeader("BOOK-NAME").toString()).isEqualTo("foo");

            // and:
                DocumentContext parsedJson = JsonPath.parse(contractVerifierObjectMapper.writeValueAsString(response.getPayload()));
                assertThatJson(parsedJson).field("['bookName']").isEqualTo("foo");
        }

    }
    "###);
}

#[test]
fn messages_sent_from_an_input_destination() {
    let contract = Contract::messaging("shouldForwardBook.yml")
        .with_input(
            Input::from_destination("jms:input")
                .with_body(BodyValue::mapping([("bookName", BodyValue::text("foo"))])),
        )
        .with_output_message(OutputMessage::sent_to("jms:output"));
    let group = ContractGroup::new("books", vec![contract]);
    let rendered = render_class(&group, &config()).unwrap();
    assert!(rendered.contains("contractVerifierMessaging.send(inputMessage, \"jms:input\");"));
    assert!(rendered.contains("contractVerifierMessaging.receive(\"jms:output\");"));
    assert!(!rendered.contains("parsedJson"));
}

// ============ JAX-RS ============

#[test]
fn jaxrs_class_has_no_given_section() {
    let config = config().with_mode(TestMode::JaxRsClient);
    let group = ContractGroup::new("users", vec![get_user()]);
    let rendered = render_class(&group, &config).unwrap();
    assert!(rendered.contains("import javax.ws.rs.core.Response;"));
    assert!(rendered.contains("import static javax.ws.rs.client.Entity.*;"));
    assert!(!rendered.contains("// given:"));
    assert!(rendered.contains(
        "            Response response = webTarget\n                    .path(\"/users/1\")\n"
    ));
    assert!(rendered.contains("assertThat(response.getStatus()).isEqualTo(200);"));
    assert!(rendered.contains("assertThat(response.getHeaderString(\"Content-Type\")).isNotNull();"));
    assert!(rendered.contains("DocumentContext parsedJson = JsonPath.parse(responseAsString);"));
}

// ============ Configuration exhaustion ============

#[test]
fn spock_with_java_exhausts_class_metadata() {
    let config = config().with_framework(TestFramework::Spock);
    assert_eq!(config.target_language, TargetLanguage::Java);
    let group = ContractGroup::new("fraud", vec![get_user()]);
    let err = render_class(&group, &config).unwrap_err();
    assert!(matches!(
        err,
        RenderError::ConfigurationExhaustion {
            point: "class metadata"
        }
    ));
}

#[test]
fn junit_with_groovy_exhausts_class_metadata() {
    let config = config().with_language(TargetLanguage::Groovy);
    let group = ContractGroup::new("fraud", vec![get_user()]);
    let err = render_class(&group, &config).unwrap_err();
    assert!(err.to_string().contains("class metadata"));
}
