//! Class and method renderers.
//!
//! [`ClassRenderer`] drives one render call: it derives per-contract
//! metadata, selects the class fragments and hands every contract to a
//! [`MethodRenderer`], which appends the method to the shared assembler and
//! returns the [`Span`](crate::assembler::Span) post-processors may rewrite.

mod class;
mod method;

pub use class::{render_class, ClassRenderer, ContractGroup};
pub use method::MethodRenderer;
