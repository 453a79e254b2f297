//! Configuration types
//!
//! Every field is optional so partial files merge cleanly; accessors fill
//! in the defaults.

use crate::error::MarginaliaError;
use crate::result::Result;
use crate::tree::DirectiveFamily;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_INDENT_SIZE: usize = 4;
pub const DEFAULT_EOL_PADDING: usize = 2;

/// Root configuration object
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarginaliaConfig {
    /// JSON schema reference, ignored when loading
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "JSON schema reference")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Directive classification settings")]
    pub classifier: Option<ClassifierConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Rendering settings")]
    pub printer: Option<PrinterConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfiguration {
    #[schemars(description = "Recognise directives; when false every comment stays a comment")]
    pub enabled: Option<bool>,

    #[schemars(description = "Directive families to recognise (all when absent)")]
    pub families: Option<Vec<DirectiveFamily>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfiguration {
    #[schemars(description = "Spaces per indentation level")]
    pub indent_size: Option<usize>,

    #[schemars(description = "Spaces between code and an end-of-line comment")]
    pub eol_padding: Option<usize>,
}

impl Default for ClassifierConfiguration {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            families: None,
        }
    }
}

impl Default for PrinterConfiguration {
    fn default() -> Self {
        Self {
            indent_size: Some(DEFAULT_INDENT_SIZE),
            eol_padding: Some(DEFAULT_EOL_PADDING),
        }
    }
}

impl MarginaliaConfig {
    /// Load from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| MarginaliaError::io_error(path, err))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|err| MarginaliaError::config_error(err.to_string())),
            Some("json") => serde_json::from_str(&content)
                .map_err(|err| MarginaliaError::config_error(err.to_string())),
            _ => Err(MarginaliaError::config_error(format!(
                "unsupported config format '{}' (expected .toml or .json)",
                path.display()
            ))),
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfiguration {
        self.classifier.clone().unwrap_or_default()
    }

    pub fn printer_config(&self) -> PrinterConfiguration {
        self.printer.clone().unwrap_or_default()
    }

    /// Merge `other` into this config; values already set here win.
    pub fn merge_with(&mut self, other: MarginaliaConfig) {
        if let Some(other) = other.classifier {
            match self.classifier.as_mut() {
                Some(classifier) => classifier.merge_with(other),
                None => self.classifier = Some(other),
            }
        }
        if let Some(other) = other.printer {
            match self.printer.as_mut() {
                Some(printer) => printer.merge_with(other),
                None => self.printer = Some(other),
            }
        }
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(MarginaliaConfig))
            .unwrap_or(serde_json::Value::Null)
    }
}

impl ClassifierConfiguration {
    pub fn merge_with(&mut self, other: ClassifierConfiguration) {
        if self.enabled.is_none() {
            self.enabled = other.enabled;
        }
        if self.families.is_none() {
            self.families = other.families;
        }
    }
}

impl PrinterConfiguration {
    pub fn merge_with(&mut self, other: PrinterConfiguration) {
        if self.indent_size.is_none() {
            self.indent_size = other.indent_size;
        }
        if self.eol_padding.is_none() {
            self.eol_padding = other.eol_padding;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families_deserialize_by_short_name() {
        let config: MarginaliaConfig = serde_json::from_str(
            r#"{"classifier": {"families": ["openmp", "include", "endif"]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.classifier_config().families,
            Some(vec![
                DirectiveFamily::OpenMpPragma,
                DirectiveFamily::Include,
                DirectiveFamily::Endif
            ])
        );
        assert_eq!(config.classifier_config().enabled, None);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = MarginaliaConfig::default();
        assert_eq!(config.printer_config().indent_size, Some(4));
        assert_eq!(config.classifier_config().enabled, Some(true));
    }

    #[test]
    fn test_merge_keeps_current_values() {
        let mut config: MarginaliaConfig =
            toml::from_str("[printer]\nindentSize = 2\n").unwrap();
        config.merge_with(MarginaliaConfig {
            printer: Some(PrinterConfiguration {
                indent_size: Some(8),
                eol_padding: Some(1),
            }),
            classifier: Some(ClassifierConfiguration {
                enabled: Some(false),
                families: None,
            }),
            ..Default::default()
        });
        let printer = config.printer_config();
        assert_eq!(printer.indent_size, Some(2));
        assert_eq!(printer.eol_padding, Some(1));
        assert_eq!(config.classifier_config().enabled, Some(false));
    }

    #[test]
    fn test_schema_mentions_sections() {
        let schema = MarginaliaConfig::json_schema().to_string();
        assert!(schema.contains("classifier"));
        assert!(schema.contains("indentSize"));
    }
}
