//! Plain-text and binary body verification.

use crate::model::BodyValue;
use crate::syntax::AssertionSyntaxProfile;

use super::{AssertionKind, BodyAssertion, BodySynthesis};

/// Compares the whole body as one string.
///
/// `file_expression` is the expression reading a text fixture, used when
/// the expected body is file-backed.
pub fn text_body(
    profile: &AssertionSyntaxProfile,
    source: &str,
    expected: &BodyValue,
    file_expression: Option<&str>,
) -> BodySynthesis {
    let (kind, line) = match (expected, file_expression) {
        (BodyValue::Regex(_), _) => (
            AssertionKind::Regex,
            profile.assert_value("responseBody", expected),
        ),
        (BodyValue::ComputedRef(command), _) => {
            (AssertionKind::Command, command.insert_value("responseBody"))
        }
        (BodyValue::FileRef(_), Some(expression)) => (
            AssertionKind::Equality,
            format!("{}{}", profile.assert_that("responseBody"), profile.is_equal_to(expression)),
        ),
        (BodyValue::FileRef(file), None) => (
            AssertionKind::Equality,
            format!(
                "{}{}",
                profile.assert_that("responseBody"),
                profile.is_equal_to(&profile.quoted(&file.as_string()))
            ),
        ),
        (BodyValue::Scalar(scalar), _) => (
            AssertionKind::Equality,
            format!(
                "{}{}",
                profile.assert_that("responseBody"),
                profile.is_equal_to(&profile.quoted(&scalar.display()))
            ),
        ),
        (other, _) => (
            AssertionKind::Equality,
            format!(
                "{}{}",
                profile.assert_that("responseBody"),
                profile.is_equal_to(&profile.quoted(&other.to_json()))
            ),
        ),
    };
    BodySynthesis {
        declarations: vec![format!("String responseBody = {}", source)],
        residual: vec![BodyAssertion::new("$", kind, line)],
        matched: Vec::new(),
    }
}

/// Compares the raw bytes of the body against a fixture.
pub fn binary_body(profile: &AssertionSyntaxProfile, bytes_expression: &str) -> BodySynthesis {
    BodySynthesis {
        declarations: Vec::new(),
        residual: vec![BodyAssertion::new(
            "$",
            AssertionKind::Bytes,
            format!(
                "{}{}",
                profile.assert_that(profile.byte_array_accessor()),
                profile.is_equal_to(bytes_expression)
            ),
        )],
        matched: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetLanguage;
    use crate::syntax::Harness;

    fn profile() -> AssertionSyntaxProfile {
        AssertionSyntaxProfile::new(TargetLanguage::Java, Harness::RestAssured)
    }

    #[test]
    fn plain_text_and_patterns() {
        let profile = profile();
        let plain = text_body(&profile, "response.getBody().asString()", &BodyValue::text("pong"), None);
        assert_eq!(
            plain.declarations,
            vec!["String responseBody = response.getBody().asString()"]
        );
        assert_eq!(plain.residual[0].line, "assertThat(responseBody).isEqualTo(\"pong\")");

        let pattern = text_body(&profile, "x", &BodyValue::regex("po.g"), None);
        assert_eq!(pattern.residual[0].line, "assertThat(responseBody).matches(\"po.g\")");
        assert_eq!(pattern.residual[0].kind, AssertionKind::Regex);
    }

    #[test]
    fn bytes_compare_against_the_fixture() {
        let synthesis = binary_body(&profile(), "fileToBytes(this, \"ping_response_body.bin\")");
        assert!(synthesis.declarations.is_empty());
        assert_eq!(
            synthesis.residual[0].line,
            "assertThat(response.getBody().asByteArray()).isEqualTo(fileToBytes(this, \"ping_response_body.bin\"))"
        );
        assert_eq!(synthesis.residual[0].kind, AssertionKind::Bytes);
    }
}
