use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
}

/// How results are rendered.
///
/// Example YAML:
/// ```yaml
/// output:
///   format: table
///   precision: 2
///   colors: auto
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Decimal places for scores (default: 2)
    #[serde(default = "default_precision")]
    pub precision: usize,

    #[serde(default)]
    pub colors: ColorMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: default_precision(),
            colors: ColorMode::default(),
        }
    }
}

fn default_precision() -> usize {
    2
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.output.precision, 2);
        assert_eq!(config.output.colors, ColorMode::Auto);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_parse() {
        let yaml = r#"
output:
  format: json
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.precision, 2);
        assert_eq!(config.output.colors, ColorMode::Auto);
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
output:
  colour: always
"#;
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }
}
