//! Fixture extraction for file-backed bodies.
//!
//! A file-backed body is not inlined into the generated test. Its bytes are
//! written next to the generated class, and again under the generated test
//! resources root, and the test loads them back at run time.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RenderConfig;
use crate::metadata::{Direction, SingleContractMetadata};
use crate::model::FromFile;
use crate::{RenderError, RenderResult};

/// Charset the generated code assumes when none is given.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Turns a file-backed body into a source expression loading it.
pub trait BodyReader {
    /// Persists the fixture for `file` and returns the fixture file name.
    fn store_fixture(
        &self,
        metadata: &SingleContractMetadata<'_>,
        file: &FromFile,
        direction: Direction,
    ) -> RenderResult<String>;

    /// Expression evaluating to the fixture's bytes.
    fn bytes_expression(
        &self,
        metadata: &SingleContractMetadata<'_>,
        file: &FromFile,
        direction: Direction,
    ) -> RenderResult<String> {
        let name = self.store_fixture(metadata, file, direction)?;
        Ok(format!("fileToBytes(this, \"{}\")", name))
    }

    /// Expression evaluating to the fixture's text.
    fn string_expression(
        &self,
        metadata: &SingleContractMetadata<'_>,
        file: &FromFile,
        direction: Direction,
    ) -> RenderResult<String> {
        let bytes = self.bytes_expression(metadata, file, direction)?;
        Ok(match file.charset() {
            Some(charset) if !charset.eq_ignore_ascii_case(DEFAULT_CHARSET) => {
                format!("new String({}, \"{}\")", bytes, charset)
            }
            _ => format!("new String({})", bytes),
        })
    }
}

/// Writes fixtures under the generated test sources and resources roots.
///
/// Writes are skipped when the target exists, so rendering twice, or two
/// renders sharing an output root, leave one copy of each fixture.
#[derive(Debug, Clone)]
pub struct FsBodyReader {
    test_class_dir: PathBuf,
    sources_root: PathBuf,
    resources_root: PathBuf,
}

impl FsBodyReader {
    /// Reader for classes generated into `package`.
    pub fn new(config: &RenderConfig, package: &str) -> Self {
        let test_class_dir = package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(config.generated_test_sources_dir.clone(), |dir, segment| {
                dir.join(segment)
            });
        Self {
            test_class_dir,
            sources_root: config.generated_test_sources_dir.clone(),
            resources_root: config.generated_test_resources_dir.clone(),
        }
    }

    pub fn test_class_dir(&self) -> &Path {
        &self.test_class_dir
    }

    /// `{method}_{direction}_{file}`.
    pub fn fixture_name(method_name: &str, direction: Direction, file_name: &str) -> String {
        let file_name = Path::new(file_name)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        format!("{}_{}_{}", method_name, direction.as_str(), file_name)
    }
}

impl BodyReader for FsBodyReader {
    fn store_fixture(
        &self,
        metadata: &SingleContractMetadata<'_>,
        file: &FromFile,
        direction: Direction,
    ) -> RenderResult<String> {
        let name = Self::fixture_name(metadata.method_name(), direction, &file.file_name);
        let target = self.test_class_dir.join(&name);
        write_once(&target, &file.contents)?;

        let relative = target
            .strip_prefix(&self.sources_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(&name));
        write_once(&self.resources_root.join(relative), &file.contents)?;
        Ok(name)
    }
}

/// Writes `bytes` unless `path` already exists. Returns whether it wrote.
fn write_once(path: &Path, bytes: &[u8]) -> RenderResult<bool> {
    if path.exists() {
        debug!(path = %path.display(), "fixture exists, skipping write");
        return Ok(false);
    }
    let io_error = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, bytes).map_err(io_error)?;
    debug!(path = %path.display(), "wrote fixture");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contract, Request, Response};

    fn contract() -> Contract {
        Contract::http("download.yml", Request::new("GET"), Response::new(200))
    }

    #[test]
    fn fixtures_are_written_once_to_both_roots() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::junit5().with_output_dirs(
            dir.path().join("sources"),
            dir.path().join("resources"),
        );
        let reader = FsBodyReader::new(&config, "com.example");
        let contract = contract();
        let metadata = SingleContractMetadata::new(&contract, &config);
        let file = FromFile::bytes("payload.bin", vec![1u8, 2, 3]);

        let expression = reader
            .bytes_expression(&metadata, &file, Direction::Response)
            .unwrap();
        assert_eq!(
            expression,
            "fileToBytes(this, \"validate_download_response_payload.bin\")"
        );

        let source = dir
            .path()
            .join("sources/com/example/validate_download_response_payload.bin");
        let resource = dir
            .path()
            .join("resources/com/example/validate_download_response_payload.bin");
        assert_eq!(fs::read(&source).unwrap(), vec![1u8, 2, 3]);
        assert_eq!(fs::read(&resource).unwrap(), vec![1u8, 2, 3]);

        // Existing fixtures are left untouched.
        fs::write(&source, b"edited").unwrap();
        reader
            .bytes_expression(&metadata, &file, Direction::Response)
            .unwrap();
        assert_eq!(fs::read(&source).unwrap(), b"edited".to_vec());
    }

    #[test]
    fn string_expressions_name_non_default_charsets() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::junit5().with_output_dirs(
            dir.path().join("sources"),
            dir.path().join("resources"),
        );
        let reader = FsBodyReader::new(&config, "com.example");
        let contract = contract();
        let metadata = SingleContractMetadata::new(&contract, &config);

        let utf8 = FromFile::text("body.txt", "hello");
        assert_eq!(
            reader
                .string_expression(&metadata, &utf8, Direction::Request)
                .unwrap(),
            "new String(fileToBytes(this, \"validate_download_request_body.txt\"))"
        );

        let latin = FromFile::text("latin.txt", "hello").with_charset("ISO-8859-1");
        assert_eq!(
            reader
                .string_expression(&metadata, &latin, Direction::Request)
                .unwrap(),
            "new String(fileToBytes(this, \"validate_download_request_latin.txt\"), \"ISO-8859-1\")"
        );
    }
}
