//! The JSON-path subset used for matcher lookup and removal.
//!
//! Supported: `$`, `.name`, `['name']`, `["name"]`, `[n]`, `[*]`, `.*`,
//! `..name`, `..*`. Filters, slices and unions are rejected.
//!
//! Evaluation resolves a path to concrete [`Location`]s first; reading and
//! deleting both work on those, so both agree on what a path denotes.

use thiserror::Error;

use crate::model::{BodyMatchers, BodyValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonPathError {
    #[error("invalid JSON path <{path}>: {message}")]
    Invalid { path: String, message: String },

    #[error("no value at JSON path <{path}>")]
    NotFound { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
    /// `..name`: the key at any depth, including the current node.
    Descendant(String),
    /// `..*`: every node below the current one.
    DescendantWildcard,
}

/// One step of a concrete location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

pub type Location = Vec<Step>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(raw: &str) -> Result<Self, JsonPathError> {
        let segments = Parser::new(raw).parse()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A definite path denotes at most one value.
    pub fn is_definite(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Field(_) | Segment::Index(_)))
    }

    /// Every concrete location the path denotes in `root`, in document order.
    pub fn locate(&self, root: &BodyValue) -> Vec<Location> {
        let mut current: Vec<Location> = vec![Vec::new()];
        for segment in &self.segments {
            let mut next = Vec::new();
            for location in &current {
                let node = match value_at(root, location) {
                    Some(node) => node,
                    None => continue,
                };
                match segment {
                    Segment::Field(name) => {
                        if node.get(name).is_some() {
                            next.push(child(location, Step::Key(name.clone())));
                        }
                    }
                    Segment::Index(index) => {
                        if let BodyValue::Sequence(items) = node {
                            if *index < items.len() {
                                next.push(child(location, Step::Index(*index)));
                            }
                        }
                    }
                    Segment::Wildcard => next.extend(children(node, location)),
                    Segment::Descendant(name) => {
                        walk(node, location, &mut |loc, value| {
                            if value.get(name).is_some() {
                                next.push(child(loc, Step::Key(name.clone())));
                            }
                        });
                    }
                    Segment::DescendantWildcard => {
                        for direct in children(node, location) {
                            walk_owned(root, direct, &mut next);
                        }
                    }
                }
            }
            current = next;
        }
        current
    }

    /// Reads the value at a definite path, or the sequence of all matches
    /// of an indefinite one.
    pub fn read(&self, root: &BodyValue) -> Result<BodyValue, JsonPathError> {
        let locations = self.locate(root);
        if self.is_definite() {
            locations
                .first()
                .and_then(|location| value_at(root, location))
                .cloned()
                .ok_or_else(|| JsonPathError::NotFound {
                    path: self.raw.clone(),
                })
        } else {
            Ok(BodyValue::Sequence(
                locations
                    .iter()
                    .filter_map(|location| value_at(root, location))
                    .cloned()
                    .collect(),
            ))
        }
    }

    /// Whether the path resolves to at least one value.
    pub fn exists(&self, root: &BodyValue) -> bool {
        !self.locate(root).is_empty()
    }

    /// Removes every location the path denotes, returning what was removed.
    pub fn delete(&self, root: &mut BodyValue) -> Vec<Location> {
        let mut locations = self.locate(root);
        // Later siblings first so earlier sequence indices stay valid.
        locations.sort();
        locations.reverse();
        locations
            .into_iter()
            .filter(|location| remove_at(root, location))
            .collect()
    }
}

/// `[*]` or `..` anywhere in the path.
pub fn is_array_related(path: &str) -> bool {
    path.contains("[*]") || path.contains("..")
}

/// Renders a location as a bracketed JSON path, e.g. `$['items'][0]`.
pub fn location_to_path(location: &[Step]) -> String {
    let mut path = String::from("$");
    for step in location {
        match step {
            Step::Key(key) => {
                path.push_str("['");
                path.push_str(key);
                path.push_str("']");
            }
            Step::Index(index) => path.push_str(&format!("[{}]", index)),
        }
    }
    path
}

pub fn value_at<'a>(root: &'a BodyValue, location: &[Step]) -> Option<&'a BodyValue> {
    let mut node = root;
    for step in location {
        node = match (step, node) {
            (Step::Key(key), BodyValue::Mapping(_)) => node.get(key)?,
            (Step::Index(index), BodyValue::Sequence(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(node)
}

fn value_at_mut<'a>(root: &'a mut BodyValue, location: &[Step]) -> Option<&'a mut BodyValue> {
    let mut node = root;
    for step in location {
        node = match (step, node) {
            (Step::Key(key), node @ BodyValue::Mapping(_)) => node.get_mut(key)?,
            (Step::Index(index), BodyValue::Sequence(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Removes the value at `location`; the root itself is never removed.
pub fn remove_at(root: &mut BodyValue, location: &[Step]) -> bool {
    let (last, parent) = match location.split_last() {
        Some(split) => split,
        None => return false,
    };
    match (value_at_mut(root, parent), last) {
        (Some(BodyValue::Mapping(entries)), Step::Key(key)) => {
            match entries.iter().position(|(k, _)| k == key) {
                Some(position) => {
                    entries.remove(position);
                    true
                }
                None => false,
            }
        }
        (Some(BodyValue::Sequence(items)), Step::Index(index)) if *index < items.len() => {
            items.remove(*index);
            true
        }
        _ => false,
    }
}

/// Copies `body` and removes every path covered by a matcher, pruning the
/// containers left empty by the removal (never the root).
///
/// Matchers whose path does not parse or resolve are left for the
/// assertion stage to report.
pub fn remove_matching_paths(body: &BodyValue, matchers: &BodyMatchers) -> BodyValue {
    let mut copy = body.clone();
    for matcher in matchers {
        let path = match JsonPath::parse(&matcher.path) {
            Ok(path) => path,
            Err(_) => continue,
        };
        for removed in path.delete(&mut copy) {
            prune_empty_ancestors(&mut copy, &removed);
        }
    }
    copy
}

fn prune_empty_ancestors(root: &mut BodyValue, removed: &[Step]) {
    let mut ancestor = removed.to_vec();
    ancestor.pop();
    while !ancestor.is_empty() {
        let empty = value_at(root, &ancestor).map_or(false, BodyValue::is_empty_container);
        if !empty || !remove_at(root, &ancestor) {
            break;
        }
        ancestor.pop();
    }
}

fn child(location: &[Step], step: Step) -> Location {
    let mut next = location.to_vec();
    next.push(step);
    next
}

fn children(node: &BodyValue, location: &[Step]) -> Vec<Location> {
    match node {
        BodyValue::Mapping(entries) => entries
            .iter()
            .map(|(key, _)| child(location, Step::Key(key.clone())))
            .collect(),
        BodyValue::Sequence(items) => (0..items.len())
            .map(|index| child(location, Step::Index(index)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Pre-order walk over `node` and everything below it.
fn walk<F>(node: &BodyValue, location: &[Step], visit: &mut F)
where
    F: FnMut(&[Step], &BodyValue),
{
    visit(location, node);
    match node {
        BodyValue::Mapping(entries) => {
            for (key, value) in entries {
                walk(value, &child(location, Step::Key(key.clone())), visit);
            }
        }
        BodyValue::Sequence(items) => {
            for (index, value) in items.iter().enumerate() {
                walk(value, &child(location, Step::Index(index)), visit);
            }
        }
        _ => {}
    }
}

fn walk_owned(root: &BodyValue, location: Location, out: &mut Vec<Location>) {
    let node = match value_at(root, &location) {
        Some(node) => node,
        None => return,
    };
    let below = children(node, &location);
    out.push(location);
    for next in below {
        walk_owned(root, next, out);
    }
}

struct Parser<'a> {
    raw: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.trim().chars().collect(),
            pos: 0,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> JsonPathError {
        JsonPathError::Invalid {
            path: self.raw.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn parse(mut self) -> Result<Vec<Segment>, JsonPathError> {
        if self.peek() != Some('$') {
            return Err(self.invalid("must start with '$'"));
        }
        self.pos += 1;
        let mut segments = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' if self.chars.get(self.pos + 1) == Some(&'.') => {
                    self.pos += 2;
                    segments.push(self.descendant()?);
                }
                '.' => {
                    self.pos += 1;
                    if self.peek() == Some('*') {
                        self.pos += 1;
                        segments.push(Segment::Wildcard);
                    } else {
                        segments.push(Segment::Field(self.name()?));
                    }
                }
                '[' => segments.push(self.bracket()?),
                other => return Err(self.invalid(format!("unexpected character '{}'", other))),
            }
        }
        Ok(segments)
    }

    fn descendant(&mut self) -> Result<Segment, JsonPathError> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(Segment::DescendantWildcard)
            }
            Some('[') => match self.bracket()? {
                Segment::Field(name) => Ok(Segment::Descendant(name)),
                Segment::Wildcard => Ok(Segment::DescendantWildcard),
                _ => Err(self.invalid("recursive descent needs a name or '*'")),
            },
            _ => Ok(Segment::Descendant(self.name()?)),
        }
    }

    fn name(&mut self) -> Result<String, JsonPathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.invalid("empty property name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn bracket(&mut self) -> Result<Segment, JsonPathError> {
        self.pos += 1;
        self.skip_spaces();
        let segment = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some(quote @ '\'') | Some(quote @ '"') => {
                self.pos += 1;
                let mut name = String::new();
                loop {
                    match self.peek() {
                        Some('\\') if self.chars.get(self.pos + 1) == Some(&quote) => {
                            name.push(quote);
                            self.pos += 2;
                        }
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            name.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.invalid("unterminated quoted name")),
                    }
                }
                Segment::Field(name)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse::<usize>()
                    .map_err(|e| self.invalid(e.to_string()))?;
                Segment::Index(index)
            }
            Some('?') | Some(':') | Some('-') | Some('(') => {
                return Err(self.invalid("filters and slices are not supported"))
            }
            _ => return Err(self.invalid("unexpected bracket content")),
        };
        self.skip_spaces();
        if self.peek() != Some(']') {
            return Err(self.invalid("expected ']'"));
        }
        self.pos += 1;
        Ok(segment)
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }
}
