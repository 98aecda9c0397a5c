//! Renders contract definitions into executable test sources.
//!
//! A contract describes one HTTP request/response or messaging
//! input/output interaction. For each contract the renderer emits one test
//! method; for a group of contracts it emits one test class in the
//! configured dialect (JUnit 4, JUnit 5 or Spock) and harness (MockMvc,
//! explicit Rest Assured, WebTestClient or a JAX-RS client).
//!
//! ## Overview
//!
//! Rendering is a pure, deterministic function of the contract group and
//! the [`RenderConfig`], apart from fixture files extracted from
//! file-backed bodies. Those are written through a [`BodyReader`] and are
//! skipped when they already exist.
//!
//! ## Modules
//!
//! - [`model`] - The in-memory contract model and body value union
//! - [`metadata`] - Per-contract derived facts
//! - [`config`] - Render configuration, loadable from TOML
//! - [`assembler`] - Indented text buffer with termination rules
//! - [`emit`] - Emit instructions recorded by fragments
//! - [`syntax`] - Literal and assertion spelling per output profile
//! - [`jsonpath`] - The JSON-path subset used by body verification
//! - [`body`] - Body verification synthesis (JSON, XML, text, binary)
//! - [`collaborators`] - Body reader, template processor, base class resolver
//! - [`fragments`] - Fragment tables per extension point
//! - [`render`] - Class and method renderers
//! - [`errors`] - Error types

pub mod assembler;
pub mod body;
pub mod collaborators;
pub mod config;
pub mod emit;
pub mod errors;
pub mod fragments;
pub mod jsonpath;
pub mod metadata;
pub mod model;
pub mod render;
pub mod syntax;

// Re-exports for convenient access to core types
pub use assembler::{Span, TextAssembler};
pub use body::{AssertionKind, BodyAssertion, BodySynthesis};
pub use collaborators::{
    BaseClassResolver, BodyReader, FsBodyReader, MappingBaseClassResolver,
    RequestTemplateProcessor, TemplateProcessor,
};
pub use config::{BaseClassMapping, RenderConfig, TargetLanguage, TestFramework, TestMode};
pub use emit::{Emit, EmitBuffer};
pub use errors::{RenderError, RenderResult};
pub use fragments::ExtensionPoint;
pub use metadata::{ContentType, Direction, SingleContractMetadata};
pub use model::{
    BodyMatcher, BodyMatchers, BodyValue, Contract, MatchingStrategy, MatchingStrategyKind,
    MatchingType, Request, Response,
};
pub use render::{render_class, ClassRenderer, ContractGroup, MethodRenderer};
pub use syntax::AssertionSyntaxProfile;

#[cfg(test)]
mod tests {
    mod classes;
    mod properties;
    mod scenarios;
}
