//! Render configuration.
//!
//! A [`RenderConfig`] selects the output profile: target language,
//! test-framework dialect and HTTP harness, plus the inputs for base class
//! resolution and fixture placement. It is immutable for a render call.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{RenderError, RenderResult};

/// Language of the generated sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    Java,
    Groovy,
}

impl TargetLanguage {
    pub fn line_ending(self) -> &'static str {
        match self {
            TargetLanguage::Java => ";",
            TargetLanguage::Groovy => "",
        }
    }

    /// Marker that turns BDD labels into comments where they are not syntax.
    pub fn label_prefix(self) -> &'static str {
        match self {
            TargetLanguage::Java => "// ",
            TargetLanguage::Groovy => "",
        }
    }
}

/// Test-framework dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFramework {
    JUnit4,
    JUnit5,
    Spock,
    /// No framework annotations or imports; the base class drives execution.
    Custom,
}

/// HTTP harness used to issue requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    MockMvc,
    Explicit,
    WebTestClient,
    JaxRsClient,
}

impl TestMode {
    /// Modes driven through Rest Assured.
    pub fn is_rest_assured(self) -> bool {
        matches!(
            self,
            TestMode::MockMvc | TestMode::Explicit | TestMode::WebTestClient
        )
    }
}

/// Maps contract package paths matching `pattern` to a base class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BaseClassMapping {
    pub pattern: String,
    pub base_class: String,
}

/// Configuration for a render call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub target_language: TargetLanguage,
    pub test_framework: TestFramework,
    pub test_mode: TestMode,
    /// Root package of generated classes.
    pub package_name: String,
    /// Overrides the dialect's class name suffix (`Test` or `Spec`).
    pub name_suffix_for_tests: Option<String>,
    pub base_class_for_tests: Option<String>,
    pub package_with_base_classes: Option<String>,
    /// First matching mapping wins.
    pub base_class_mappings: Vec<BaseClassMapping>,
    pub imports: Vec<String>,
    pub static_imports: Vec<String>,
    /// Annotation class added as a rule field (JUnit dialects only).
    pub rule_class_for_tests: Option<String>,
    /// Contract names rendered as ignored regardless of their own flag.
    pub ignored_contracts: Vec<String>,
    /// Verify arrays by index and size instead of containment.
    pub assert_json_size: bool,
    /// Render in-progress contracts instead of skipping them.
    pub include_in_progress: bool,
    pub indent_unit: String,
    pub generated_test_sources_dir: PathBuf,
    pub generated_test_resources_dir: PathBuf,
}

impl RenderConfig {
    /// JUnit 5 with MockMvc, the default profile.
    pub fn junit5() -> Self {
        Self {
            target_language: TargetLanguage::Java,
            test_framework: TestFramework::JUnit5,
            test_mode: TestMode::MockMvc,
            package_name: "org.springframework.cloud.contract.verifier.tests".into(),
            name_suffix_for_tests: None,
            base_class_for_tests: None,
            package_with_base_classes: None,
            base_class_mappings: Vec::new(),
            imports: Vec::new(),
            static_imports: Vec::new(),
            rule_class_for_tests: None,
            ignored_contracts: Vec::new(),
            assert_json_size: false,
            include_in_progress: false,
            indent_unit: "\t".into(),
            generated_test_sources_dir: PathBuf::from("target/generated-test-sources/contracts"),
            generated_test_resources_dir: PathBuf::from(
                "target/generated-test-resources/contracts",
            ),
        }
    }

    pub fn junit4() -> Self {
        Self::junit5().with_framework(TestFramework::JUnit4)
    }

    /// Spock specifications in Groovy.
    pub fn spock() -> Self {
        Self::junit5()
            .with_framework(TestFramework::Spock)
            .with_language(TargetLanguage::Groovy)
    }

    pub fn custom() -> Self {
        Self::junit5().with_framework(TestFramework::Custom)
    }

    pub fn with_framework(mut self, framework: TestFramework) -> Self {
        self.test_framework = framework;
        self
    }

    pub fn with_language(mut self, language: TargetLanguage) -> Self {
        self.target_language = language;
        self
    }

    pub fn with_mode(mut self, mode: TestMode) -> Self {
        self.test_mode = mode;
        self
    }

    pub fn with_package(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = package_name.into();
        self
    }

    pub fn with_base_class(mut self, base_class: impl Into<String>) -> Self {
        self.base_class_for_tests = Some(base_class.into());
        self
    }

    pub fn with_package_with_base_classes(mut self, package: impl Into<String>) -> Self {
        self.package_with_base_classes = Some(package.into());
        self
    }

    pub fn with_base_class_mapping(
        mut self,
        pattern: impl Into<String>,
        base_class: impl Into<String>,
    ) -> Self {
        self.base_class_mappings.push(BaseClassMapping {
            pattern: pattern.into(),
            base_class: base_class.into(),
        });
        self
    }

    pub fn with_name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.name_suffix_for_tests = Some(suffix.into());
        self
    }

    pub fn with_assert_json_size(mut self, assert_json_size: bool) -> Self {
        self.assert_json_size = assert_json_size;
        self
    }

    pub fn with_indent_unit(mut self, indent_unit: impl Into<String>) -> Self {
        self.indent_unit = indent_unit.into();
        self
    }

    pub fn with_output_dirs(mut self, sources: impl Into<PathBuf>, resources: impl Into<PathBuf>) -> Self {
        self.generated_test_sources_dir = sources.into();
        self.generated_test_resources_dir = resources.into();
        self
    }

    /// Class name suffix for the active dialect.
    pub fn class_suffix(&self) -> &str {
        match &self.name_suffix_for_tests {
            Some(suffix) if !suffix.is_empty() => suffix,
            _ if self.test_framework == TestFramework::Spock => "Spec",
            _ => "Test",
        }
    }

    /// Parses a TOML document; missing keys fall back to [`RenderConfig::default`].
    pub fn from_toml_str(content: &str) -> RenderResult<Self> {
        toml::from_str(content).map_err(|e| RenderError::Config {
            message: e.to_string(),
        })
    }

    /// Loads a TOML configuration file.
    pub fn load(path: &Path) -> RenderResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| RenderError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::junit5()
    }
}
