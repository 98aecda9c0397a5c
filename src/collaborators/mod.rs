//! Collaborators the renderers consume through narrow interfaces.
//!
//! Each has a trait and the implementation used by default.

pub mod base_class;
pub mod body_reader;
pub mod naming;
pub mod template;

pub use base_class::{BaseClassResolver, MappingBaseClassResolver};
pub use body_reader::{BodyReader, FsBodyReader};
pub use template::{RequestTemplateProcessor, TemplateProcessor};
