//! YAML reading for record files

pub mod diagnostics;

pub use diagnostics::YamlSyntaxError;

use serde::de::DeserializeOwned;

/// Parse record content, reporting failures against the named source
pub fn parse_record<T: DeserializeOwned>(
    content: &str,
    filename: &str,
) -> Result<T, YamlSyntaxError> {
    serde_yml::from_str(content).map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename))
}
