//! One test class per contract group.

use std::collections::HashSet;

use tracing::debug;

use crate::assembler::TextAssembler;
use crate::collaborators::naming::{camel_case, capitalize, package_segment, path_segments};
use crate::collaborators::{
    BaseClassResolver, BodyReader, FsBodyReader, MappingBaseClassResolver, RequestTemplateProcessor,
    TemplateProcessor,
};
use crate::config::RenderConfig;
use crate::emit::EmitBuffer;
use crate::fragments::class::{
    ClassMetadata, CLASS_ANNOTATIONS, CLASS_METADATA, FIELDS, IMPORTS, STATIC_IMPORTS,
};
use crate::fragments::ClassContext;
use crate::metadata::SingleContractMetadata;
use crate::model::Contract;
use crate::RenderResult;

use super::MethodRenderer;

/// Contracts rendered into one class, with their path relative to the
/// contracts root (e.g. `users/v1`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractGroup {
    pub relative_path: String,
    pub contracts: Vec<Contract>,
}

impl ContractGroup {
    pub fn new(relative_path: impl Into<String>, contracts: Vec<Contract>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contracts,
        }
    }

    /// The configured root package plus every path segment but the last.
    pub fn package(&self, config: &RenderConfig) -> String {
        let segments = path_segments(&self.relative_path);
        let parents = match segments.split_last() {
            Some((_, parents)) => parents,
            None => &[],
        };
        let mut parts: Vec<String> = Vec::with_capacity(parents.len() + 1);
        if !config.package_name.is_empty() {
            parts.push(config.package_name.clone());
        }
        parts.extend(parents.iter().map(|segment| package_segment(segment)));
        parts.join(".")
    }

    /// The last path segment, camel-cased and capitalized, plus the
    /// dialect suffix.
    pub fn class_name(&self, config: &RenderConfig) -> String {
        let stem = path_segments(&self.relative_path)
            .last()
            .map(|segment| capitalize(&camel_case(segment)))
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "ContractVerifier".to_string());
        let stem = if stem.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{}", stem)
        } else {
            stem
        };
        format!("{}{}", stem, config.class_suffix())
    }
}

/// Renders a [`ContractGroup`] into the source of one test class.
///
/// Collaborators default to the filesystem body reader (rooted at the
/// class's package), the request template processor and the mapping base
/// class resolver.
pub struct ClassRenderer<'a> {
    config: &'a RenderConfig,
    body_reader: Option<&'a dyn BodyReader>,
    templates: &'a dyn TemplateProcessor,
    base_classes: &'a dyn BaseClassResolver,
}

impl<'a> ClassRenderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            body_reader: None,
            templates: &RequestTemplateProcessor,
            base_classes: &MappingBaseClassResolver,
        }
    }

    pub fn with_body_reader(mut self, body_reader: &'a dyn BodyReader) -> Self {
        self.body_reader = Some(body_reader);
        self
    }

    pub fn with_templates(mut self, templates: &'a dyn TemplateProcessor) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_base_class_resolver(mut self, resolver: &'a dyn BaseClassResolver) -> Self {
        self.base_classes = resolver;
        self
    }

    pub fn render(&self, group: &ContractGroup) -> RenderResult<String> {
        let config = self.config;
        let package = group.package(config);
        let class_name = group.class_name(config);
        debug!(
            class = %class_name,
            contracts = group.contracts.len(),
            "rendering class"
        );

        let base_class = self.base_classes.resolve(&group.relative_path, config)?;
        let mut contracts: Vec<SingleContractMetadata<'_>> = group
            .contracts
            .iter()
            .map(|contract| SingleContractMetadata::new(contract, config))
            .collect();
        if contracts.iter().any(SingleContractMetadata::is_ordered) {
            contracts.sort_by_key(|metadata| metadata.contract.order.unwrap_or(usize::MAX));
        }

        let ctx = ClassContext {
            config,
            package: &package,
            class_name: &class_name,
            base_class: base_class.as_deref(),
            contracts: &contracts,
        };
        let metadata = CLASS_METADATA.select_one(&ctx)?;

        let fs_reader;
        let body_reader: &dyn BodyReader = match self.body_reader {
            Some(reader) => reader,
            None => {
                fs_reader = FsBodyReader::new(config, &package);
                &fs_reader
            }
        };
        let methods = MethodRenderer::new(config, body_reader, self.templates);

        let mut assembler = TextAssembler::new(config.indent_unit.as_str())
            .with_line_ending(config.target_language.line_ending())
            .with_label_prefix(config.target_language.label_prefix());

        let preamble = preamble(metadata, &ctx);
        preamble.check_balance()?;
        preamble.flatten_into(&mut assembler)?;

        assembler.add_indented(&metadata.class_header(&ctx));
        let mut rendered = 0;
        assembler.wrap_in_braces(|body| {
            for field in FIELDS.select_all(&ctx) {
                for declaration in field.declarations(&ctx) {
                    body.add_line_with_ending(&declaration);
                }
            }
            for contract in ctx.contracts {
                if methods.render(contract, body)?.is_some() {
                    rendered += 1;
                }
            }
            body.add_empty_line();
            Ok(())
        })?;

        debug!(
            class = %class_name,
            contracts = group.contracts.len(),
            methods = rendered,
            "class rendered"
        );
        assembler.into_string()
    }
}

/// Package line, imports, static imports and class annotations.
fn preamble(metadata: &ClassMetadata, ctx: &ClassContext<'_>) -> EmitBuffer {
    let mut buffer = EmitBuffer::new();
    buffer.line_with_ending(metadata.package_line(ctx.package));
    buffer.empty_line();

    let imports = unique(IMPORTS.select_all(ctx).into_iter().flat_map(|i| i.imports(ctx)));
    if !imports.is_empty() {
        for import in imports {
            buffer.line_with_ending(format!("import {}", import));
        }
        buffer.empty_line();
    }

    let statics = unique(
        STATIC_IMPORTS
            .select_all(ctx)
            .into_iter()
            .flat_map(|i| i.imports(ctx)),
    );
    if !statics.is_empty() {
        for import in statics {
            buffer.line_with_ending(format!("import static {}", import));
        }
        buffer.empty_line();
    }

    for annotation in CLASS_ANNOTATIONS.select_all(ctx) {
        buffer.line(annotation.annotation(ctx));
    }
    buffer
}

/// Drops repeats, keeping first occurrences in order.
fn unique<I: IntoIterator<Item = String>>(lines: I) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

/// Renders `group` with the default collaborators.
pub fn render_class(group: &ContractGroup, config: &RenderConfig) -> RenderResult<String> {
    ClassRenderer::new(config).render(group)
}
