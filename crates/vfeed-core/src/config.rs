#![forbid(unsafe_code)]

//! Mount configuration for the recycling list.
//!
//! All tunables live in a single [`FeedConfig`]. Construction of an engine
//! goes through [`FeedConfig::validated`], so a bad page size or threshold
//! fails at mount time instead of on the first scroll.
//!
//! # Loading
//!
//! With the `config-file` feature the config can be loaded from TOML or JSON:
//!
//! ```toml
//! page_size = 20
//! item_margin = 12.0
//! sentinel_threshold = 0.1
//!
//! [top_sentinel]
//! class_name = "virtual-top-observer absolute-center"
//! ```
//!
//! ```rust,ignore
//! let config = FeedConfig::from_toml_file("vfeed.toml")?.validated()?;
//! ```
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `page_size` | 10 |
//! | `item_margin` | 0.0 |
//! | `sentinel_threshold` | 0.1 |
//! | `top_sentinel` | [`ObserverOptions::sentinel`] with the top class |
//! | `bottom_sentinel` | [`ObserverOptions::sentinel`] with the bottom class |
//!
//! The engine's sentinels are observed at `sentinel_threshold`, so
//! `top_sentinel.threshold` and `bottom_sentinel.threshold` must equal it.

#[cfg(feature = "config-file")]
use std::path::Path;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Edge;

/// Ratio used by generic boundary observers.
pub const DEFAULT_OBSERVER_THRESHOLD: f64 = 0.25;

/// Ratio above which a sentinel crossing starts a transition.
pub const DEFAULT_SENTINEL_THRESHOLD: f64 = 0.1;

/// Default number of items fetched per transition.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where a sentinel element is inserted relative to the host container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum InsertPosition {
    /// Before the container itself.
    BeforeBegin,
    /// As the container's first child.
    AfterBegin,
    /// As the container's last child.
    #[default]
    BeforeEnd,
    /// After the container itself.
    AfterEnd,
}

/// Placement and styling of one boundary sentinel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ObserverOptions {
    /// Visibility ratio at which the observer reports a crossing. Default: 0.25.
    pub threshold: f64,
    /// Insert position inside the host container. Default: `BeforeEnd`.
    pub insert_position: InsertPosition,
    /// Space separated utility classes added to the sentinel element.
    pub class_name: String,
    /// Element tag. Default: `div`.
    pub tag: String,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OBSERVER_THRESHOLD,
            insert_position: InsertPosition::BeforeEnd,
            class_name: String::new(),
            tag: "div".into(),
        }
    }
}

impl ObserverOptions {
    /// Options for one of the engine's own sentinels.
    #[must_use]
    pub fn sentinel(edge: Edge) -> Self {
        let class_name = match edge {
            Edge::Top => "virtual-top-observer absolute-center",
            Edge::Bottom => "virtual-bottom-observer absolute-center",
        };
        Self {
            threshold: DEFAULT_SENTINEL_THRESHOLD,
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    /// Class names as the sentinel element will carry them.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        std::iter::once("intersection-observer").chain(self.class_name.split_whitespace())
    }

    fn validate_into(&self, name: &str, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&self.threshold) {
            errors.push(format!(
                "{name}.threshold must be in [0, 1], got {}",
                self.threshold
            ));
        }
        if self.tag.trim().is_empty() {
            errors.push(format!("{name}.tag must not be empty"));
        }
    }
}

/// Mount configuration for a recycling list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct FeedConfig {
    /// Items fetched per transition. The pool holds twice this many slots.
    pub page_size: usize,
    /// Vertical gap between consecutive slots.
    pub item_margin: f64,
    /// A visibility callback with a ratio at or below this value is ignored.
    /// Both sentinels' `threshold` must match it.
    pub sentinel_threshold: f64,
    /// Options for the sentinel pinned to the first slot.
    pub top_sentinel: ObserverOptions,
    /// Options for the sentinel pinned to the last slot.
    pub bottom_sentinel: ObserverOptions,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            item_margin: 0.0,
            sentinel_threshold: DEFAULT_SENTINEL_THRESHOLD,
            top_sentinel: ObserverOptions::sentinel(Edge::Top),
            bottom_sentinel: ObserverOptions::sentinel(Edge::Bottom),
        }
    }
}

impl FeedConfig {
    /// Default config with the given page size.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Set the inter-item margin.
    #[must_use]
    pub fn item_margin(mut self, margin: f64) -> Self {
        self.item_margin = margin;
        self
    }

    /// Set the sentinel trigger ratio on the engine and on both sentinels.
    #[must_use]
    pub fn sentinel_threshold(mut self, threshold: f64) -> Self {
        self.sentinel_threshold = threshold;
        self.top_sentinel.threshold = threshold;
        self.bottom_sentinel.threshold = threshold;
        self
    }

    /// Observer options for the given edge.
    #[must_use]
    pub fn sentinel_options(&self, edge: Edge) -> &ObserverOptions {
        match edge {
            Edge::Top => &self.top_sentinel,
            Edge::Bottom => &self.bottom_sentinel,
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every parameter.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.page_size == 0 {
            errors.push("page_size must be > 0".into());
        } else if self.page_size > usize::MAX / 2 {
            errors.push(format!(
                "page_size {} overflows the pool capacity",
                self.page_size
            ));
        }

        if !self.item_margin.is_finite() || self.item_margin < 0.0 {
            errors.push(format!(
                "item_margin must be a finite value >= 0, got {}",
                self.item_margin
            ));
        }

        if !(0.0..=1.0).contains(&self.sentinel_threshold) {
            errors.push(format!(
                "sentinel_threshold must be in [0, 1], got {}",
                self.sentinel_threshold
            ));
        }

        self.top_sentinel.validate_into("top_sentinel", &mut errors);
        self.bottom_sentinel
            .validate_into("bottom_sentinel", &mut errors);

        let in_range = |t: f64| (0.0..=1.0).contains(&t);
        for (name, sentinel) in [
            ("top_sentinel", &self.top_sentinel),
            ("bottom_sentinel", &self.bottom_sentinel),
        ] {
            if in_range(self.sentinel_threshold)
                && in_range(sentinel.threshold)
                && sentinel.threshold != self.sentinel_threshold
            {
                errors.push(format!(
                    "{name}.threshold {} must equal sentinel_threshold {}",
                    sentinel.threshold, self.sentinel_threshold
                ));
            }
        }

        errors
    }

    /// Validate and freeze the config.
    pub fn validated(self) -> Result<ValidConfig, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(ValidConfig(self))
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// A [`FeedConfig`] that passed [`FeedConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidConfig(FeedConfig);

impl ValidConfig {
    /// Items fetched per transition.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.0.page_size
    }

    /// Maximum simultaneous live slots.
    #[must_use]
    pub fn pool_capacity(&self) -> usize {
        self.0.page_size * 2
    }

    /// Vertical gap between consecutive slots.
    #[must_use]
    pub fn item_margin(&self) -> f64 {
        self.0.item_margin
    }

    /// Ratio a visibility callback must exceed.
    #[must_use]
    pub fn sentinel_threshold(&self) -> f64 {
        self.0.sentinel_threshold
    }

    /// The underlying config.
    #[must_use]
    pub fn get(&self) -> &FeedConfig {
        &self.0
    }
}

impl TryFrom<FeedConfig> for ValidConfig {
    type Error = ConfigError;

    fn try_from(config: FeedConfig) -> Result<Self, Self::Error> {
        config.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FeedConfig::default();
        assert!(config.validate().is_empty());
        let valid = config.validated().expect("default config");
        assert_eq!(valid.page_size(), 10);
        assert_eq!(valid.pool_capacity(), 20);
        assert_eq!(valid.sentinel_threshold(), 0.1);
    }

    #[test]
    fn generic_observer_threshold_differs_from_sentinel() {
        assert_eq!(ObserverOptions::default().threshold, 0.25);
        assert_eq!(ObserverOptions::sentinel(Edge::Top).threshold, 0.1);
    }

    #[test]
    fn zero_page_size_fails_fast() {
        let err = FeedConfig::with_page_size(0).validated().unwrap_err();
        match err {
            ConfigError::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("page_size"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn collects_every_problem() {
        let mut config = FeedConfig::with_page_size(0).item_margin(f64::NAN);
        config.sentinel_threshold = 1.5;
        config.bottom_sentinel.tag = "  ".into();
        config.top_sentinel.threshold = -0.1;
        let errors = config.validate();
        assert_eq!(errors.len(), 5, "{errors:?}");
    }

    #[test]
    fn threshold_setter_keeps_sentinels_in_step() {
        let config = FeedConfig::default().sentinel_threshold(0.5);
        assert_eq!(config.top_sentinel.threshold, 0.5);
        assert_eq!(config.bottom_sentinel.threshold, 0.5);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn sentinel_threshold_mismatch_rejected() {
        let mut config = FeedConfig::default();
        config.sentinel_threshold = 0.3;
        let errors = config.validate();
        assert_eq!(
            errors,
            vec![
                "top_sentinel.threshold 0.1 must equal sentinel_threshold 0.3".to_owned(),
                "bottom_sentinel.threshold 0.1 must equal sentinel_threshold 0.3".to_owned(),
            ]
        );
    }

    #[test]
    fn negative_margin_rejected() {
        let errors = FeedConfig::default().item_margin(-1.0).validate();
        assert!(errors.iter().any(|e| e.contains("item_margin")));
    }

    #[test]
    fn sentinel_classes_include_utility_class() {
        let options = ObserverOptions::sentinel(Edge::Bottom);
        let classes: Vec<_> = options.classes().collect();
        assert_eq!(
            classes,
            vec![
                "intersection-observer",
                "virtual-bottom-observer",
                "absolute-center"
            ]
        );
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_overrides_keep_defaults() {
        let config = FeedConfig::from_toml_str("page_size = 25\nitem_margin = 4.0\n")
            .expect("parse toml");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.item_margin, 4.0);
        assert_eq!(config.sentinel_threshold, DEFAULT_SENTINEL_THRESHOLD);
        assert_eq!(config.top_sentinel, ObserverOptions::sentinel(Edge::Top));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn json_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vfeed.json");
        let config = FeedConfig::with_page_size(7).item_margin(2.0);
        std::fs::write(&path, serde_json::to_string(&config).expect("to json"))
            .expect("write config");
        let loaded = FeedConfig::from_json_file(&path).expect("load json");
        assert_eq!(loaded, config);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FeedConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = FeedConfig::from_toml_str("page_size = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
