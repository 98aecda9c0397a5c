//! Fragment tables per extension point.
//!
//! A fragment is a tagged variant with a predicate (`accepts`) and a way of
//! recording emit instructions. Each extension point owns a static table of
//! fragments in registration order. Exclusive-choice points take the first
//! accepting entry and fail with [`RenderError::ConfigurationExhaustion`]
//! when none accepts; filter points take every accepting entry.

use std::fmt;

use tracing::trace;

use crate::collaborators::{BodyReader, TemplateProcessor};
use crate::config::RenderConfig;
use crate::metadata::SingleContractMetadata;
use crate::syntax::AssertionSyntaxProfile;
use crate::{RenderError, RenderResult};

pub mod body;
pub mod class;
pub mod http;
pub mod jaxrs;
pub mod messaging;
pub mod method;
pub mod rest_assured;

/// Named places in a rendered class where fragments plug in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
    ClassMetadata,
    Imports,
    StaticImports,
    ClassAnnotations,
    Fields,
    MethodAnnotations,
    MethodSignature,
    MethodPreProcessors,
    Given,
    RequestSpecification,
    When,
    RequestIssue,
    Then,
    ResponseBody,
    MethodPostProcessors,
}

impl ExtensionPoint {
    /// Human-readable name, used in configuration exhaustion errors.
    pub fn name(self) -> &'static str {
        match self {
            ExtensionPoint::ClassMetadata => "class metadata",
            ExtensionPoint::Imports => "imports",
            ExtensionPoint::StaticImports => "static imports",
            ExtensionPoint::ClassAnnotations => "class annotations",
            ExtensionPoint::Fields => "fields",
            ExtensionPoint::MethodAnnotations => "method annotations",
            ExtensionPoint::MethodSignature => "method signature",
            ExtensionPoint::MethodPreProcessors => "method pre-processors",
            ExtensionPoint::Given => "given",
            ExtensionPoint::RequestSpecification => "request specification",
            ExtensionPoint::When => "when",
            ExtensionPoint::RequestIssue => "request issue",
            ExtensionPoint::Then => "then",
            ExtensionPoint::ResponseBody => "response body",
            ExtensionPoint::MethodPostProcessors => "method post-processors",
        }
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fragment's predicate over the context of its extension point.
pub trait Fragment<C: ?Sized> {
    fn accepts(&self, ctx: &C) -> bool;
}

/// The fragments registered at one extension point, in registration order.
#[derive(Debug)]
pub struct FragmentTable<'t, F> {
    point: ExtensionPoint,
    entries: &'t [F],
}

impl<'t, F> FragmentTable<'t, F> {
    pub const fn new(point: ExtensionPoint, entries: &'t [F]) -> Self {
        Self { point, entries }
    }

    pub fn point(&self) -> ExtensionPoint {
        self.point
    }

    pub fn entries(&self) -> &'t [F] {
        self.entries
    }

    /// The first accepting entry.
    pub fn select_one<C: ?Sized>(&self, ctx: &C) -> RenderResult<&'t F>
    where
        F: Fragment<C> + fmt::Debug,
    {
        match self.entries.iter().find(|entry| entry.accepts(ctx)) {
            Some(entry) => {
                trace!(point = self.point.name(), chosen = ?entry, "fragment selected");
                Ok(entry)
            }
            None => Err(RenderError::ConfigurationExhaustion {
                point: self.point.name(),
            }),
        }
    }

    /// Every accepting entry, in registration order.
    pub fn select_all<C: ?Sized>(&self, ctx: &C) -> Vec<&'t F>
    where
        F: Fragment<C>,
    {
        self.entries
            .iter()
            .filter(|entry| entry.accepts(ctx))
            .collect()
    }
}

/// What class-level fragments see: the whole group.
pub struct ClassContext<'a> {
    pub config: &'a RenderConfig,
    pub package: &'a str,
    pub class_name: &'a str,
    /// Fully qualified base class, if one resolved.
    pub base_class: Option<&'a str>,
    pub contracts: &'a [SingleContractMetadata<'a>],
}

impl<'a> ClassContext<'a> {
    /// Whether any contract of the group satisfies `predicate`.
    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: Fn(&SingleContractMetadata<'a>) -> bool,
    {
        self.contracts.iter().any(predicate)
    }

    /// Simple name of the base class.
    pub fn base_class_simple_name(&self) -> Option<&'a str> {
        self.base_class
            .map(|base| base.rsplit('.').next().unwrap_or(base))
    }
}

/// What method-level fragments see: one contract and its collaborators.
pub struct MethodContext<'a> {
    pub config: &'a RenderConfig,
    pub metadata: &'a SingleContractMetadata<'a>,
    pub profile: AssertionSyntaxProfile,
    pub body_reader: &'a dyn BodyReader,
    pub templates: &'a dyn TemplateProcessor,
}

impl<'a> MethodContext<'a> {
    pub fn new(
        config: &'a RenderConfig,
        metadata: &'a SingleContractMetadata<'a>,
        body_reader: &'a dyn BodyReader,
        templates: &'a dyn TemplateProcessor,
    ) -> Self {
        Self {
            config,
            metadata,
            profile: AssertionSyntaxProfile::for_contract(config, metadata),
            body_reader,
            templates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Probe {
        Even,
        Small,
        Any,
    }

    impl Fragment<u32> for Probe {
        fn accepts(&self, n: &u32) -> bool {
            match self {
                Probe::Even => n % 2 == 0,
                Probe::Small => *n < 10,
                Probe::Any => true,
            }
        }
    }

    static PROBES: FragmentTable<'static, Probe> =
        FragmentTable::new(ExtensionPoint::Given, &[Probe::Even, Probe::Small, Probe::Any]);

    static EMPTY: FragmentTable<'static, Probe> =
        FragmentTable::new(ExtensionPoint::ClassMetadata, &[]);

    #[test]
    fn first_registered_wins() {
        assert_eq!(PROBES.select_one(&4u32).unwrap(), &Probe::Even);
        assert_eq!(PROBES.select_one(&3u32).unwrap(), &Probe::Small);
        assert_eq!(PROBES.select_one(&11u32).unwrap(), &Probe::Any);
    }

    #[test]
    fn exhaustion_names_the_point() {
        let err = EMPTY.select_one(&1u32).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ConfigurationExhaustion { point: "class metadata" }
        ));
        assert!(err.to_string().contains("class metadata"));
    }

    #[test]
    fn select_all_keeps_registration_order() {
        assert_eq!(
            PROBES.select_all(&2u32),
            vec![&Probe::Even, &Probe::Small, &Probe::Any]
        );
        assert_eq!(PROBES.select_all(&13u32), vec![&Probe::Any]);
        assert!(EMPTY.select_all(&2u32).is_empty());
    }
}
