//! Base class resolution for generated test classes.

use regex::Regex;
use tracing::debug;

use super::naming::{capitalize, package_segment, path_segments};
use crate::config::RenderConfig;
use crate::{RenderError, RenderResult};

/// Picks the class a generated test class extends.
pub trait BaseClassResolver {
    /// `contract_path` is the group's path relative to the contracts root,
    /// e.g. `users/v1`. `None` means the class extends nothing.
    fn resolve(&self, contract_path: &str, config: &RenderConfig) -> RenderResult<Option<String>>;
}

/// Mappings first, then a name derived from `package_with_base_classes`,
/// then `base_class_for_tests`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingBaseClassResolver;

impl BaseClassResolver for MappingBaseClassResolver {
    fn resolve(&self, contract_path: &str, config: &RenderConfig) -> RenderResult<Option<String>> {
        let segments = path_segments(contract_path);
        let as_package = segments.join(".");

        for mapping in &config.base_class_mappings {
            let pattern = Regex::new(&format!("^(?:{})$", mapping.pattern)).map_err(|e| {
                RenderError::Config {
                    message: format!("invalid base class mapping <{}>: {}", mapping.pattern, e),
                }
            })?;
            if pattern.is_match(&as_package) {
                debug!(
                    package = %as_package,
                    pattern = %mapping.pattern,
                    base_class = %mapping.base_class,
                    "base class mapping matched"
                );
                return Ok(Some(mapping.base_class.clone()));
            }
        }

        match config.package_with_base_classes.as_deref() {
            Some(package) if !package.is_empty() => {
                let name: String = match segments.as_slice() {
                    [] => String::new(),
                    [only] => capitalize(&package_segment(only)),
                    [.., second_last, last] => format!(
                        "{}{}",
                        capitalize(&package_segment(second_last)),
                        capitalize(&package_segment(last))
                    ),
                };
                Ok(Some(format!("{}.{}Base", package, name)))
            }
            _ => Ok(config.base_class_for_tests.clone()),
        }
    }
}
