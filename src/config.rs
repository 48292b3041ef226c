use indexmap::IndexSet;
use serde::Deserialize;

use crate::constants::aggregation::DEFAULT_INITIATOR_TYPES;
use crate::errors::MonitorError;
use crate::types::InitiatorType;

/// Construction-time configuration for a monitoring session.
///
/// Deserializes from `{ "initiatorTypes": [...], "ignoreQuery": bool, "disabled": bool }`;
/// every field is optional and falls back to [`MonitorConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Initiator types that are grouped; records with any other tag are ignored.
    pub initiator_types: IndexSet<InitiatorType>,
    /// Strip the query component before computing identity keys.
    pub ignore_query: bool,
    /// Turn the whole session into a no-op.
    #[serde(alias = "disable")]
    pub disabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            initiator_types: DEFAULT_INITIATOR_TYPES
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            ignore_query: true,
            disabled: false,
        }
    }
}

impl MonitorConfig {
    /// Decode a configuration from its JSON construction surface.
    pub fn from_json_str(raw: &str) -> Result<Self, MonitorError> {
        serde_json::from_str(raw).map_err(|err| MonitorError::Configuration(err.to_string()))
    }

    /// Replace the tracked initiator types.
    pub fn with_initiator_types<I, S>(mut self, initiator_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<InitiatorType>,
    {
        self.initiator_types = initiator_types.into_iter().map(Into::into).collect();
        self
    }

    /// Configure query-string stripping.
    pub fn with_ignore_query(mut self, ignore_query: bool) -> Self {
        self.ignore_query = ignore_query;
        self
    }

    /// Configure the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns `true` when records with `initiator_type` take part in grouping.
    pub fn tracks(&self, initiator_type: &str) -> bool {
        self.initiator_types.contains(initiator_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tracks_script_link_and_css() {
        let config = MonitorConfig::default();
        assert!(config.tracks("script"));
        assert!(config.tracks("link"));
        assert!(config.tracks("css"));
        assert!(!config.tracks("img"));
        assert!(config.ignore_query);
        assert!(!config.disabled);
    }

    #[test]
    fn json_fields_are_optional() {
        let config = MonitorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MonitorConfig::default());

        let config = MonitorConfig::from_json_str(r#"{"ignoreQuery": false}"#).unwrap();
        assert!(!config.ignore_query);
        assert!(config.tracks("script"));
    }

    #[test]
    fn json_accepts_disable_alias() {
        let config =
            MonitorConfig::from_json_str(r#"{"disable": true, "initiatorTypes": ["img"]}"#)
                .unwrap();
        assert!(config.disabled);
        assert!(config.tracks("img"));
        assert!(!config.tracks("script"));
    }

    #[test]
    fn invalid_json_is_a_configuration_error() {
        let err = MonitorConfig::from_json_str(r#"{"ignoreQuery": "yes"}"#).unwrap_err();
        assert!(matches!(err, MonitorError::Configuration(_)));
    }

    #[test]
    fn builders_override_defaults() {
        let config = MonitorConfig::default()
            .with_initiator_types(["img", "fetch"])
            .with_ignore_query(false)
            .with_disabled(true);
        assert_eq!(config.initiator_types.len(), 2);
        assert!(config.tracks("fetch"));
        assert!(!config.ignore_query);
        assert!(config.disabled);
    }
}
