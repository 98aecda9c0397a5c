//! Structural matchers that override plain equality for a body path.

use super::BodyValue;

/// How a matched path is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingType {
    Equality,
    Type,
    Command,
    Regex,
    Date,
    Time,
    Timestamp,
    Null,
}

impl MatchingType {
    /// Regex and the date/time variants, which are regexes with a built-in pattern.
    pub fn is_regex_related(self) -> bool {
        matches!(
            self,
            MatchingType::Regex | MatchingType::Date | MatchingType::Time | MatchingType::Timestamp
        )
    }

    /// ISO pattern used when a date/time matcher carries no explicit value.
    pub fn default_pattern(self) -> Option<&'static str> {
        match self {
            MatchingType::Date => Some(r"(\d\d\d\d)-(0[1-9]|1[012])-(0[1-9]|[12][0-9]|3[01])"),
            MatchingType::Time => Some(r"(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])"),
            MatchingType::Timestamp => Some(
                r"([0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])(\.\d+)?",
            ),
            _ => None,
        }
    }
}

/// A rule for one structural path (JSON-path or XPath) inside a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMatcher {
    pub path: String,
    pub matching_type: MatchingType,
    pub value: Option<BodyValue>,
    /// Only meaningful for [`MatchingType::Type`] against collections.
    pub min_occurrence: Option<usize>,
    pub max_occurrence: Option<usize>,
}

impl BodyMatcher {
    pub fn new(path: impl Into<String>, matching_type: MatchingType) -> Self {
        Self {
            path: path.into(),
            matching_type,
            value: None,
            min_occurrence: None,
            max_occurrence: None,
        }
    }

    pub fn equality(path: impl Into<String>) -> Self {
        Self::new(path, MatchingType::Equality)
    }

    pub fn regex(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(path, MatchingType::Regex).with_value(BodyValue::regex(pattern))
    }

    pub fn type_of(path: impl Into<String>) -> Self {
        Self::new(path, MatchingType::Type)
    }

    pub fn null(path: impl Into<String>) -> Self {
        Self::new(path, MatchingType::Null)
    }

    pub fn command(path: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(path, MatchingType::Command).with_value(BodyValue::command(command))
    }

    pub fn with_value(mut self, value: BodyValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_min(mut self, min: usize) -> Self {
        self.min_occurrence = Some(min);
        self
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max_occurrence = Some(max);
        self
    }

    pub fn has_occurrence_bounds(&self) -> bool {
        self.min_occurrence.is_some() || self.max_occurrence.is_some()
    }

    /// The explicit value, or the built-in pattern of a date/time matcher.
    pub fn effective_value(&self) -> Option<BodyValue> {
        match &self.value {
            Some(value) => Some(value.clone()),
            None => self
                .matching_type
                .default_pattern()
                .map(BodyValue::regex),
        }
    }
}

/// Matchers in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyMatchers {
    matchers: Vec<BodyMatcher>,
}

impl BodyMatchers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, matcher: BodyMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn push(&mut self, matcher: BodyMatcher) {
        self.matchers.push(matcher);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BodyMatcher> {
        self.matchers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }
}

impl FromIterator<BodyMatcher> for BodyMatchers {
    fn from_iter<I: IntoIterator<Item = BodyMatcher>>(iter: I) -> Self {
        Self {
            matchers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BodyMatchers {
    type Item = &'a BodyMatcher;
    type IntoIter = std::slice::Iter<'a, BodyMatcher>;

    fn into_iter(self) -> Self::IntoIter {
        self.matchers.iter()
    }
}
