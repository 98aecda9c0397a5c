//! XML body verification through XPath.

use std::collections::HashMap;

use crate::model::{BodyMatcher, BodyMatchers, BodyValue, MatchingType, Scalar};
use crate::syntax::AssertionSyntaxProfile;
use crate::{RenderError, RenderResult};

use super::{AssertionKind, BodyAssertion, BodySynthesis};

/// A text or attribute value of the document and the XPath addressing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlLeaf {
    pub xpath: String,
    pub value: String,
}

/// Every non-empty text and attribute value, in document order.
///
/// Repeated sibling elements get a 1-based position predicate; unique
/// ones do not.
pub fn xml_leaves(text: &str) -> RenderResult<Vec<XmlLeaf>> {
    let document = roxmltree::Document::parse(text)
        .map_err(|e| RenderError::malformed(format!("body is not valid XML: {}", e)))?;
    let root = document.root_element();
    let mut leaves = Vec::new();
    collect(root, &format!("/{}", root.tag_name().name()), &mut leaves);
    Ok(leaves)
}

fn collect(node: roxmltree::Node<'_, '_>, path: &str, leaves: &mut Vec<XmlLeaf>) {
    for attribute in node.attributes() {
        leaves.push(XmlLeaf {
            xpath: format!("{}/@{}", path, attribute.name()),
            value: attribute.value().to_string(),
        });
    }

    let elements: Vec<_> = node.children().filter(|n| n.is_element()).collect();
    if elements.is_empty() {
        let text: String = node
            .children()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let text = text.trim();
        if !text.is_empty() {
            leaves.push(XmlLeaf {
                xpath: format!("{}/text()", path),
                value: text.to_string(),
            });
        }
        return;
    }

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for element in &elements {
        *totals.entry(element.tag_name().name()).or_default() += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for element in elements {
        let name = element.tag_name().name();
        let position = seen.entry(name).or_default();
        *position += 1;
        let step = if totals[name] > 1 {
            format!("{}[{}]", name, position)
        } else {
            name.to_string()
        };
        collect(element, &format!("{}/{}", path, step), leaves);
    }
}

/// Normalizes a simple absolute XPath so `/a/b` and `/a[1]/b[1]` compare
/// equal. Anything beyond child steps, attributes and `text()` yields `None`.
fn normalize(xpath: &str) -> Option<String> {
    let rest = xpath.strip_prefix('/')?;
    let mut out = String::new();
    for step in rest.split('/') {
        if step.is_empty() || step == "*" {
            return None;
        }
        if step == "text()" || step.starts_with('@') {
            out.push('/');
            out.push_str(step);
            continue;
        }
        let (name, position) = match step.split_once('[') {
            Some((name, predicate)) => {
                let position = predicate.strip_suffix(']')?.parse::<usize>().ok()?;
                (name, position)
            }
            None => (step, 1),
        };
        out.push_str(&format!("/{}[{}]", name, position));
    }
    Some(out)
}

fn covers(matcher: &str, leaf: &str) -> bool {
    leaf == matcher
        || leaf
            .strip_prefix(matcher)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Synthesizes XPath assertions for one XML body.
pub struct XmlBodySynthesizer {
    profile: AssertionSyntaxProfile,
}

impl XmlBodySynthesizer {
    pub fn new(profile: AssertionSyntaxProfile) -> Self {
        Self { profile }
    }

    pub fn synthesize(
        &self,
        body: &BodyValue,
        matchers: &BodyMatchers,
        source: &str,
    ) -> RenderResult<BodySynthesis> {
        let text = match body {
            BodyValue::Scalar(Scalar::Text(text)) => text.clone(),
            BodyValue::FileRef(file) => file.as_string(),
            other => {
                return Err(RenderError::MalformedContract {
                    message: "XML body must be text".into(),
                    path: None,
                    body: Some(other.to_json()),
                })
            }
        };
        let leaves = xml_leaves(&text)?;
        let matcher_paths: Vec<Option<String>> = matchers.iter().map(|m| normalize(&m.path)).collect();

        let residual = leaves
            .iter()
            .filter(|leaf| {
                let leaf_path = normalize(&leaf.xpath).unwrap_or_else(|| leaf.xpath.clone());
                !matcher_paths
                    .iter()
                    .flatten()
                    .any(|matcher| covers(matcher, &leaf_path))
            })
            .map(|leaf| {
                BodyAssertion::new(
                    &leaf.xpath,
                    AssertionKind::Equality,
                    format!(
                        "assertThat(valueFromXPath(parsedXml, {})).isEqualTo({})",
                        self.profile.quoted(&leaf.xpath),
                        self.profile.quoted(&leaf.value)
                    ),
                )
            })
            .collect();

        let matched = matchers
            .iter()
            .map(|matcher| self.matcher_assertion(matcher, &leaves, &text))
            .collect::<RenderResult<Vec<_>>>()?;

        Ok(BodySynthesis {
            declarations: vec![
                "DocumentBuilderFactory builderFactory = DocumentBuilderFactory.newInstance()".into(),
                "builderFactory.setNamespaceAware(true)".into(),
                "DocumentBuilder documentBuilder = builderFactory.newDocumentBuilder()".into(),
                format!(
                    "Document parsedXml = documentBuilder.parse(new InputSource(new StringReader({})))",
                    source
                ),
            ],
            residual,
            matched,
        })
    }

    fn matcher_assertion(
        &self,
        matcher: &BodyMatcher,
        leaves: &[XmlLeaf],
        text: &str,
    ) -> RenderResult<BodyAssertion> {
        let path = self.profile.quoted(&matcher.path);
        let value_of = format!("valueFromXPath(parsedXml, {})", path);
        match matcher.matching_type {
            MatchingType::Null => Ok(BodyAssertion::new(
                &matcher.path,
                AssertionKind::Null,
                format!("assertThat(nodeFromXPath(parsedXml, {})).isNull()", path),
            )),
            MatchingType::Type => Err(RenderError::unsupported(
                "type matching on XML bodies",
                "XML body verification",
            )),
            MatchingType::Command => {
                read(leaves, &matcher.path, text)?;
                let line = match &matcher.value {
                    Some(BodyValue::ComputedRef(command)) => command.insert_value(&value_of),
                    _ => return Err(RenderError::MalformedContract {
                        message: "command matcher carries no command".into(),
                        path: Some(matcher.path.clone()),
                        body: None,
                    }),
                };
                Ok(BodyAssertion::new(&matcher.path, AssertionKind::Command, line))
            }
            matching_type => {
                let is_equality = matching_type == MatchingType::Equality;
                let expected = match matcher.effective_value() {
                    Some(BodyValue::Regex(pattern)) if !is_equality => pattern,
                    Some(BodyValue::Scalar(scalar)) if !is_equality => scalar.display(),
                    _ => read(leaves, &matcher.path, text)?.to_string(),
                };
                let (kind, comparison) = if is_equality {
                    (AssertionKind::Equality, "isEqualTo")
                } else {
                    (AssertionKind::Regex, "matches")
                };
                Ok(BodyAssertion::new(
                    &matcher.path,
                    kind,
                    format!(
                        "assertThat({}).{}({})",
                        value_of,
                        comparison,
                        self.profile.quoted(&expected)
                    ),
                ))
            }
        }
    }
}

/// Value of the leaf at `xpath`, or of the text under the element it names.
fn read<'a>(leaves: &'a [XmlLeaf], xpath: &str, text: &str) -> RenderResult<&'a str> {
    let target = normalize(xpath).ok_or_else(|| RenderError::MalformedContract {
        message: "unsupported XPath expression".into(),
        path: Some(xpath.to_string()),
        body: None,
    })?;
    let as_text = format!("{}/text()", target);
    leaves
        .iter()
        .find(|leaf| {
            normalize(&leaf.xpath).map_or(false, |path| path == target || path == as_text)
        })
        .map(|leaf| leaf.value.as_str())
        .ok_or_else(|| RenderError::path_not_found(xpath, text))
}
