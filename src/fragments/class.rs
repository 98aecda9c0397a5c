//! Class-level fragments: metadata, imports, annotations and fields.

use crate::config::{TargetLanguage, TestFramework, TestMode};

use super::{ClassContext, ExtensionPoint, Fragment, FragmentTable};

/// Package line and class header of one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMetadata {
    Java,
    Groovy,
}

pub static CLASS_METADATA: FragmentTable<'static, ClassMetadata> = FragmentTable::new(
    ExtensionPoint::ClassMetadata,
    &[ClassMetadata::Java, ClassMetadata::Groovy],
);

impl Fragment<ClassContext<'_>> for ClassMetadata {
    fn accepts(&self, ctx: &ClassContext<'_>) -> bool {
        let config = ctx.config;
        match self {
            ClassMetadata::Java => {
                config.target_language == TargetLanguage::Java
                    && matches!(
                        config.test_framework,
                        TestFramework::JUnit4 | TestFramework::JUnit5 | TestFramework::Custom
                    )
            }
            ClassMetadata::Groovy => {
                config.target_language == TargetLanguage::Groovy
                    && config.test_framework == TestFramework::Spock
            }
        }
    }
}

impl ClassMetadata {
    pub fn package_line(&self, package: &str) -> String {
        format!("package {}", package)
    }

    /// The class declaration up to (not including) the opening brace.
    pub fn class_header(&self, ctx: &ClassContext<'_>) -> String {
        match (self, ctx.base_class_simple_name()) {
            (ClassMetadata::Java, Some(base)) => {
                format!("public class {} extends {} ", ctx.class_name, base)
            }
            (ClassMetadata::Java, None) => format!("public class {} ", ctx.class_name),
            (ClassMetadata::Groovy, base) => format!(
                "class {} extends {} ",
                ctx.class_name,
                base.unwrap_or("Specification")
            ),
        }
    }
}

/// Import groups, each needed by some feature of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Import {
    Custom,
    BaseClass,
    Json,
    Xml,
    TestFramework,
    Ignore,
    Ordering,
    Messaging,
    Harness,
}

pub static IMPORTS: FragmentTable<'static, Import> = FragmentTable::new(
    ExtensionPoint::Imports,
    &[
        Import::Custom,
        Import::BaseClass,
        Import::Json,
        Import::Xml,
        Import::TestFramework,
        Import::Ignore,
        Import::Ordering,
        Import::Messaging,
        Import::Harness,
    ],
);

impl Fragment<ClassContext<'_>> for Import {
    fn accepts(&self, ctx: &ClassContext<'_>) -> bool {
        match self {
            Import::Custom => !ctx.config.imports.is_empty(),
            Import::BaseClass => base_class_import(ctx).is_some(),
            Import::Json => ctx.any(|c| c.is_json()),
            Import::Xml => ctx.any(|c| c.is_xml()),
            Import::TestFramework => ctx.config.test_framework != TestFramework::Custom,
            Import::Ignore => {
                ctx.config.test_framework != TestFramework::Custom && ctx.any(|c| c.is_ignored())
            }
            Import::Ordering => {
                ctx.config.test_framework != TestFramework::Custom && ctx.any(|c| c.is_ordered())
            }
            Import::Messaging => ctx.any(|c| c.is_messaging()),
            Import::Harness => ctx.any(|c| c.is_http()),
        }
    }
}

impl Import {
    pub fn imports(&self, ctx: &ClassContext<'_>) -> Vec<String> {
        let framework = ctx.config.test_framework;
        let fixed: &[&str] = match self {
            Import::Custom => return ctx.config.imports.clone(),
            Import::BaseClass => return base_class_import(ctx).into_iter().collect(),
            Import::TestFramework => return framework_imports(ctx),
            Import::Json => &["com.jayway.jsonpath.DocumentContext", "com.jayway.jsonpath.JsonPath"],
            Import::Xml => &[
                "javax.xml.parsers.DocumentBuilder",
                "javax.xml.parsers.DocumentBuilderFactory",
                "org.w3c.dom.Document",
                "org.xml.sax.InputSource",
                "java.io.StringReader",
            ],
            Import::Ignore => match framework {
                TestFramework::JUnit4 => &["org.junit.Ignore"],
                TestFramework::JUnit5 => &["org.junit.jupiter.api.Disabled"],
                TestFramework::Spock => &["spock.lang.Ignore"],
                TestFramework::Custom => &[],
            },
            Import::Ordering => match framework {
                TestFramework::JUnit4 => &["org.junit.FixMethodOrder", "org.junit.runners.MethodSorters"],
                TestFramework::JUnit5 => &[
                    "org.junit.jupiter.api.MethodOrderer",
                    "org.junit.jupiter.api.TestMethodOrder",
                ],
                TestFramework::Spock => &["spock.lang.Stepwise"],
                TestFramework::Custom => &[],
            },
            Import::Messaging => &[
                "javax.inject.Inject",
                "org.springframework.cloud.contract.verifier.messaging.internal.ContractVerifierObjectMapper",
                "org.springframework.cloud.contract.verifier.messaging.internal.ContractVerifierMessage",
                "org.springframework.cloud.contract.verifier.messaging.internal.ContractVerifierMessaging",
            ],
            Import::Harness => match ctx.config.test_mode {
                TestMode::MockMvc => &[
                    "io.restassured.module.mockmvc.specification.MockMvcRequestSpecification",
                    "io.restassured.response.ResponseOptions",
                ],
                TestMode::Explicit => &[
                    "io.restassured.specification.RequestSpecification",
                    "io.restassured.response.Response",
                ],
                TestMode::WebTestClient => &[
                    "io.restassured.module.webtestclient.specification.WebTestClientRequestSpecification",
                    "io.restassured.module.webtestclient.response.WebTestClientResponse",
                ],
                TestMode::JaxRsClient => &["javax.ws.rs.client.Entity", "javax.ws.rs.core.Response"],
            },
        };
        fixed.iter().map(|s| s.to_string()).collect()
    }
}

/// The base class needs an import only when it lives in another package.
fn base_class_import(ctx: &ClassContext<'_>) -> Option<String> {
    let base = ctx.base_class?;
    let (package, _) = base.rsplit_once('.')?;
    if package == ctx.package {
        None
    } else {
        Some(base.to_string())
    }
}

fn framework_imports(ctx: &ClassContext<'_>) -> Vec<String> {
    let rule = ctx.config.rule_class_for_tests.as_deref();
    let mut imports: Vec<String> = Vec::new();
    match ctx.config.test_framework {
        TestFramework::JUnit4 => {
            imports.push("org.junit.Test".into());
            if rule.is_some() {
                imports.push("org.junit.Rule".into());
            }
        }
        TestFramework::JUnit5 => {
            imports.push("org.junit.jupiter.api.Test".into());
            if rule.is_some() {
                imports.push("org.junit.jupiter.api.extension.RegisterExtension".into());
            }
        }
        TestFramework::Spock => {
            if ctx.base_class.is_none() {
                imports.push("spock.lang.Specification".into());
            }
        }
        TestFramework::Custom => {}
    }
    if let Some(rule) = rule.filter(|rule| rule.contains('.')) {
        if ctx.config.test_framework != TestFramework::Spock {
            imports.push(rule.to_string());
        }
    }
    imports
}

/// Static import groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticImport {
    Default,
    Custom,
    Json,
    Messaging,
    Harness,
}

pub static STATIC_IMPORTS: FragmentTable<'static, StaticImport> = FragmentTable::new(
    ExtensionPoint::StaticImports,
    &[
        StaticImport::Default,
        StaticImport::Custom,
        StaticImport::Json,
        StaticImport::Messaging,
        StaticImport::Harness,
    ],
);

impl Fragment<ClassContext<'_>> for StaticImport {
    fn accepts(&self, ctx: &ClassContext<'_>) -> bool {
        match self {
            StaticImport::Default => true,
            StaticImport::Custom => !ctx.config.static_imports.is_empty(),
            StaticImport::Json => ctx.any(|c| c.is_json()),
            StaticImport::Messaging => ctx.any(|c| c.is_messaging()),
            StaticImport::Harness => ctx.any(|c| c.is_http()),
        }
    }
}

impl StaticImport {
    pub fn imports(&self, ctx: &ClassContext<'_>) -> Vec<String> {
        let fixed: &[&str] = match self {
            StaticImport::Custom => return ctx.config.static_imports.clone(),
            StaticImport::Default => &[
                "org.springframework.cloud.contract.verifier.assertion.SpringCloudContractAssertions.assertThat",
                "org.springframework.cloud.contract.verifier.util.ContractVerifierUtil.*",
            ],
            StaticImport::Json => &["com.toomuchcoding.jsonassert.JsonAssertion.assertThatJson"],
            StaticImport::Messaging => {
                &["org.springframework.cloud.contract.verifier.messaging.util.ContractVerifierMessagingUtil.headers"]
            }
            StaticImport::Harness => match ctx.config.test_mode {
                TestMode::MockMvc => &["io.restassured.module.mockmvc.RestAssuredMockMvc.*"],
                TestMode::Explicit => &["io.restassured.RestAssured.*"],
                TestMode::WebTestClient => &["io.restassured.module.webtestclient.RestAssuredWebTestClient.*"],
                TestMode::JaxRsClient => &["javax.ws.rs.client.Entity.*"],
            },
        };
        fixed.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAnnotation {
    SuppressWarnings,
    Ordering,
}

pub static CLASS_ANNOTATIONS: FragmentTable<'static, ClassAnnotation> = FragmentTable::new(
    ExtensionPoint::ClassAnnotations,
    &[ClassAnnotation::SuppressWarnings, ClassAnnotation::Ordering],
);

impl Fragment<ClassContext<'_>> for ClassAnnotation {
    fn accepts(&self, ctx: &ClassContext<'_>) -> bool {
        match self {
            ClassAnnotation::SuppressWarnings => ctx.config.target_language == TargetLanguage::Java,
            ClassAnnotation::Ordering => {
                ctx.config.test_framework != TestFramework::Custom && ctx.any(|c| c.is_ordered())
            }
        }
    }
}

impl ClassAnnotation {
    pub fn annotation(&self, ctx: &ClassContext<'_>) -> &'static str {
        match (self, ctx.config.test_framework) {
            (ClassAnnotation::SuppressWarnings, _) => "@SuppressWarnings(\"rawtypes\")",
            (ClassAnnotation::Ordering, TestFramework::JUnit4) => {
                "@FixMethodOrder(MethodSorters.NAME_ASCENDING)"
            }
            (ClassAnnotation::Ordering, TestFramework::Spock) => "@Stepwise",
            (ClassAnnotation::Ordering, _) => "@TestMethodOrder(MethodOrderer.MethodName.class)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Messaging,
    Rule,
}

pub static FIELDS: FragmentTable<'static, Field> =
    FragmentTable::new(ExtensionPoint::Fields, &[Field::Messaging, Field::Rule]);

impl Fragment<ClassContext<'_>> for Field {
    fn accepts(&self, ctx: &ClassContext<'_>) -> bool {
        match self {
            Field::Messaging => ctx.any(|c| c.is_messaging()),
            Field::Rule => {
                ctx.config.rule_class_for_tests.is_some()
                    && matches!(
                        ctx.config.test_framework,
                        TestFramework::JUnit4 | TestFramework::JUnit5
                    )
            }
        }
    }
}

impl Field {
    /// Field declarations; every line but annotations takes the line ending.
    pub fn declarations(&self, ctx: &ClassContext<'_>) -> Vec<String> {
        match self {
            Field::Messaging => vec![
                "@Inject ContractVerifierMessaging contractVerifierMessaging".into(),
                "@Inject ContractVerifierObjectMapper contractVerifierObjectMapper".into(),
            ],
            Field::Rule => {
                let rule = ctx.config.rule_class_for_tests.as_deref().unwrap_or_default();
                let simple = rule.rsplit('.').next().unwrap_or(rule);
                let annotation = match ctx.config.test_framework {
                    TestFramework::JUnit5 => "@RegisterExtension",
                    _ => "@Rule",
                };
                vec![format!("{} public {} rule = new {}()", annotation, simple, simple)]
            }
        }
    }
}
