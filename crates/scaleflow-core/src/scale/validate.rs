//! Resize config validation.
//!
//! Two typed entry points, one per operating mode:
//! - [`validate_config_set`]: config-list mode, called once before any input
//!   is touched. Every config needs both dimensions.
//! - [`validate_file_config`]: per-file mode, called for each item. A config
//!   needs at least one dimension.
//!
//! [`config_set_from_value`] and [`file_config_from_value`] additionally check
//! the shape of untyped JSON records (scale attributes set by an upstream
//! stage) before converting them. The first violation found is reported.
//!
//! Target formats are only checked for being non-empty here; whether a codec
//! can actually be written is the engine's call at resize time.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;

use super::{Fit, ResizeConfig};

/// Validate a whole config set (config-list mode).
pub fn validate_config_set(configs: &[ResizeConfig]) -> Result<(), ConfigError> {
    if configs.is_empty() {
        return Err(ConfigError::Empty);
    }
    for (index, config) in configs.iter().enumerate() {
        let index = Some(index);
        if config.max_width.is_none() {
            return Err(invalid(index, "maxWidth", "is required"));
        }
        if config.max_height.is_none() {
            return Err(invalid(index, "maxHeight", "is required"));
        }
        check_fields(config, index)?;
    }
    Ok(())
}

/// Validate the config attached to a single file (per-file mode).
pub fn validate_file_config(config: &ResizeConfig) -> Result<(), ConfigError> {
    if config.max_width.is_none() && config.max_height.is_none() {
        return Err(ConfigError::MissingDimensions { index: None });
    }
    check_fields(config, None)
}

/// Shape-check an untyped config list, convert it, and validate it.
pub fn config_set_from_value(value: &Value) -> Result<Vec<ResizeConfig>, ConfigError> {
    let items = value.as_array().ok_or(ConfigError::NotAList)?;
    if items.is_empty() {
        return Err(ConfigError::Empty);
    }

    let mut configs = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let index = Some(index);
        let record = item.as_object().ok_or(ConfigError::NotARecord { index })?;
        require_number(record, index, "maxWidth", "max_width")?;
        require_number(record, index, "maxHeight", "max_height")?;
        check_shape(record, index)?;
        configs.push(convert(item, index)?);
    }

    validate_config_set(&configs)?;
    Ok(configs)
}

/// Shape-check an untyped per-file config, convert it, and validate it.
pub fn file_config_from_value(value: &Value) -> Result<ResizeConfig, ConfigError> {
    let record = value
        .as_object()
        .ok_or(ConfigError::NotARecord { index: None })?;
    if lookup(record, "maxWidth", "max_width").is_none()
        && lookup(record, "maxHeight", "max_height").is_none()
    {
        return Err(ConfigError::MissingDimensions { index: None });
    }
    check_shape(record, None)?;

    let config = convert(value, None)?;
    validate_file_config(&config)?;
    Ok(config)
}

fn check_fields(config: &ResizeConfig, index: Option<usize>) -> Result<(), ConfigError> {
    if config.max_width == Some(0) {
        return Err(invalid(index, "maxWidth", "must be a positive integer"));
    }
    if config.max_height == Some(0) {
        return Err(invalid(index, "maxHeight", "must be a positive integer"));
    }
    if let Some(format) = &config.format {
        if format.trim().is_empty() {
            return Err(invalid(index, "format", "must not be empty"));
        }
    }
    if let Some(fit) = &config.fit {
        if fit.parse::<Fit>().is_err() {
            return Err(invalid(
                index,
                "fit",
                &format!("must be one of {}", Fit::NAMES.join(", ")),
            ));
        }
    }
    if config.allow_enlargement == Some(true) && config.without_enlargement == Some(true) {
        return Err(invalid(
            index,
            "allowEnlargement",
            "contradicts withoutEnlargement",
        ));
    }
    Ok(())
}

/// Type checks shared by both modes, for every optional key that is present.
fn check_shape(record: &Map<String, Value>, index: Option<usize>) -> Result<(), ConfigError> {
    if let Some(v) = lookup(record, "maxWidth", "max_width") {
        check_dimension(v, index, "maxWidth")?;
    }
    if let Some(v) = lookup(record, "maxHeight", "max_height") {
        check_dimension(v, index, "maxHeight")?;
    }
    for (field, alias) in [("format", "format"), ("fit", "fit")] {
        if let Some(v) = lookup(record, field, alias) {
            if !v.is_string() {
                return Err(invalid(index, field, "must be a string"));
            }
        }
    }
    for (field, alias) in [
        ("withoutEnlargement", "without_enlargement"),
        ("allowEnlargement", "allow_enlargement"),
        ("metadata", "metadata"),
        ("autoOrient", "auto_orient"),
    ] {
        if let Some(v) = lookup(record, field, alias) {
            if !v.is_boolean() {
                return Err(invalid(index, field, "must be a boolean"));
            }
        }
    }
    if let Some(v) = lookup(record, "formatOptions", "format_options") {
        if !v.is_object() {
            return Err(invalid(index, "formatOptions", "must be an object"));
        }
    }
    Ok(())
}

fn require_number(
    record: &Map<String, Value>,
    index: Option<usize>,
    field: &'static str,
    alias: &str,
) -> Result<(), ConfigError> {
    match lookup(record, field, alias) {
        Some(v) => check_dimension(v, index, field),
        None => Err(invalid(index, field, "must be a number")),
    }
}

fn check_dimension(
    value: &Value,
    index: Option<usize>,
    field: &'static str,
) -> Result<(), ConfigError> {
    if !value.is_number() {
        return Err(invalid(index, field, "must be a number"));
    }
    match value.as_u64() {
        Some(n) if n > 0 && n <= u64::from(u32::MAX) => Ok(()),
        _ => Err(invalid(index, field, "must be a positive integer")),
    }
}

/// Find a key under its camelCase name or snake_case alias; JSON `null`
/// counts as absent.
fn lookup<'a>(record: &'a Map<String, Value>, field: &str, alias: &str) -> Option<&'a Value> {
    record
        .get(field)
        .or_else(|| record.get(alias))
        .filter(|v| !v.is_null())
}

fn convert(value: &Value, index: Option<usize>) -> Result<ResizeConfig, ConfigError> {
    ResizeConfig::deserialize(value).map_err(|e| ConfigError::Invalid {
        index,
        field: "*",
        reason: e.to_string(),
    })
}

fn invalid(index: Option<usize>, field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        index,
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn err_string(result: Result<impl std::fmt::Debug, ConfigError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_valid_set_passes() {
        let configs = vec![
            ResizeConfig::new(500, 500).with_format("png"),
            ResizeConfig::new(100, 80).with_fit(Fit::Cover),
        ];
        assert!(validate_config_set(&configs).is_ok());
    }

    #[test]
    fn test_set_requires_both_dimensions() {
        let configs = vec![ResizeConfig::new(10, 10), ResizeConfig::width(300)];
        assert_eq!(
            err_string(validate_config_set(&configs)),
            "configs[1].maxHeight is required"
        );
    }

    #[test]
    fn test_set_rejects_zero_dimension() {
        let configs = vec![ResizeConfig::new(0, 10)];
        assert_eq!(
            err_string(validate_config_set(&configs)),
            "configs[0].maxWidth must be a positive integer"
        );
    }

    #[test]
    fn test_rejects_unknown_fit_and_empty_format() {
        let mut config = ResizeConfig::new(10, 10);
        config.fit = Some("squash".into());
        assert!(err_string(validate_file_config(&config)).starts_with("scale.fit must be one of"));

        let config = ResizeConfig::width(10).with_format(" ");
        assert_eq!(
            err_string(validate_file_config(&config)),
            "scale.format must not be empty"
        );
    }

    #[test]
    fn test_rejects_contradictory_enlargement_flags() {
        let mut config = ResizeConfig::new(10, 10).with_enlargement(true);
        config.without_enlargement = Some(true);
        assert!(err_string(validate_config_set(&[config])).contains("contradicts"));
    }

    #[test]
    fn test_file_config_needs_one_dimension() {
        assert!(validate_file_config(&ResizeConfig::height(20)).is_ok());
        assert!(matches!(
            validate_file_config(&ResizeConfig::default()),
            Err(ConfigError::MissingDimensions { index: None })
        ));
    }

    #[test]
    fn test_value_set_must_be_non_empty_array() {
        assert!(matches!(
            config_set_from_value(&json!({"maxWidth": 1})),
            Err(ConfigError::NotAList)
        ));
        assert!(matches!(
            config_set_from_value(&json!([])),
            Err(ConfigError::Empty)
        ));
    }

    #[test]
    fn test_value_set_elements_must_be_records() {
        let value = json!([{"maxWidth": 1, "maxHeight": 1}, [1, 2]]);
        assert_eq!(
            err_string(config_set_from_value(&value)),
            "configs[1] must be an object"
        );
    }

    #[test]
    fn test_value_set_type_checks() {
        assert_eq!(
            err_string(config_set_from_value(&json!([{"maxWidth": "500", "maxHeight": 1}]))),
            "configs[0].maxWidth must be a number"
        );
        assert_eq!(
            err_string(config_set_from_value(&json!([{"maxWidth": 500}]))),
            "configs[0].maxHeight must be a number"
        );
        assert_eq!(
            err_string(config_set_from_value(
                &json!([{"maxWidth": 5, "maxHeight": 5, "format": 3}])
            )),
            "configs[0].format must be a string"
        );
        assert_eq!(
            err_string(config_set_from_value(
                &json!([{"maxWidth": 5, "maxHeight": 5, "withoutEnlargement": "yes"}])
            )),
            "configs[0].withoutEnlargement must be a boolean"
        );
        assert_eq!(
            err_string(config_set_from_value(&json!([{"maxWidth": 2.5, "maxHeight": 5}]))),
            "configs[0].maxWidth must be a positive integer"
        );
    }

    #[test]
    fn test_value_set_converts_in_order() {
        let value = json!([
            {"maxWidth": 500, "maxHeight": 500, "format": "png"},
            {"max_width": 100, "max_height": 50, "formatOptions": {"quality": 60}},
        ]);
        let configs = config_set_from_value(&value).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].format.as_deref(), Some("png"));
        assert_eq!(configs[1].max_height, Some(50));
        assert_eq!(configs[1].format_option("quality"), Some(&json!(60)));
    }

    #[test]
    fn test_file_value_checks() {
        assert!(matches!(
            file_config_from_value(&json!("500x500")),
            Err(ConfigError::NotARecord { index: None })
        ));
        assert!(matches!(
            file_config_from_value(&json!({"format": "png"})),
            Err(ConfigError::MissingDimensions { index: None })
        ));
        assert_eq!(
            err_string(file_config_from_value(&json!({"maxWidth": 5, "fit": true}))),
            "scale.fit must be a string"
        );

        let config = file_config_from_value(&json!({"maxWidth": 700, "format": null})).unwrap();
        assert_eq!(config.max_width, Some(700));
        assert_eq!(config.format, None);
    }
}
