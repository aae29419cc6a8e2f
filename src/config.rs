use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::error::GalleryError;
use crate::events::DisplayId;
use crate::surface::Slide;

/// One gallery block, mirroring the options a page author sets on the gallery constructor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Primary display surface. Required.
    pub display_id: String,
    /// Thumbnail container. Required.
    pub thumbs_id: String,
    /// Container holding close/next/previous controls for the display.
    pub gallery_controls_id: Option<String>,
    /// Container holding the thumbnail pagination controls.
    pub thumbs_controls_id: Option<String>,
    /// Maximum number of visible thumbnails; `0` disables pagination.
    pub set_size: Option<i64>,
    /// Auto-rotate interval in milliseconds; `0` disables it.
    pub auto_rotate: u64,
    /// Cancel auto-rotation as soon as a manual control is used.
    pub clear_auto_rotate_on_interact: bool,
    /// Duration of the slide push animation.
    #[serde(with = "humantime_serde")]
    pub slide_transition: Duration,
    /// Duration of the thumbnail strip animation.
    #[serde(with = "humantime_serde")]
    pub thumbs_transition: Duration,
    /// Static markup consumed by the headless surface.
    pub markup: MarkupConfig,
}

impl GalleryConfig {
    pub const DEFAULT_SET_SIZE: usize = 5;

    const fn default_slide_transition() -> Duration {
        Duration::from_millis(400)
    }

    const fn default_thumbs_transition() -> Duration {
        Duration::from_millis(500)
    }

    pub fn display(&self) -> DisplayId {
        DisplayId::new(&self.display_id)
    }

    /// Set size to start with. Absent or negative values fall back to the default.
    pub fn initial_set_size(&self) -> usize {
        match self.set_size {
            None => Self::DEFAULT_SET_SIZE,
            Some(n) if n < 0 => {
                tracing::warn!(
                    display = %self.display_id,
                    set_size = n,
                    fallback = Self::DEFAULT_SET_SIZE,
                    "negative set-size in configuration; using default"
                );
                Self::DEFAULT_SET_SIZE
            }
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        }
    }

    pub fn auto_rotate_interval(&self) -> Duration {
        Duration::from_millis(self.auto_rotate)
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.display_id.trim().is_empty() {
            return Err(GalleryError::MissingDisplayId);
        }
        if self.thumbs_id.trim().is_empty() {
            return Err(GalleryError::MissingThumbsId {
                display_id: self.display_id.clone(),
            });
        }
        Ok(())
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            display_id: String::new(),
            thumbs_id: String::new(),
            gallery_controls_id: None,
            thumbs_controls_id: None,
            set_size: None,
            auto_rotate: 0,
            clear_auto_rotate_on_interact: false,
            slide_transition: Self::default_slide_transition(),
            thumbs_transition: Self::default_thumbs_transition(),
            markup: MarkupConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MarkupConfig {
    /// Thumbnails in display order.
    pub slides: Vec<Slide>,
    /// Outer width of the display, in pixels.
    pub display_width: f64,
    /// Outer width of one thumbnail including margin, in pixels.
    pub thumb_width: f64,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            display_width: 960.0,
            thumb_width: 120.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub galleries: Vec<GalleryConfig>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate invariants that serde defaults cannot express.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.galleries.is_empty(),
            "at least one gallery must be configured"
        );
        let mut seen = HashSet::new();
        for (idx, gallery) in self.galleries.iter().enumerate() {
            gallery
                .validate()
                .with_context(|| format!("invalid gallery at position {idx}"))?;
            ensure!(
                seen.insert(gallery.display_id.as_str()),
                "display-id {} is used by more than one gallery",
                gallery.display_id
            );
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_markup_options() {
        let cfg: GalleryConfig = serde_yaml::from_str(
            r#"
display-id: hero
thumbs-id: hero-thumbs
"#,
        )
        .unwrap();
        assert_eq!(cfg.initial_set_size(), 5);
        assert_eq!(cfg.auto_rotate_interval(), Duration::ZERO);
        assert!(!cfg.clear_auto_rotate_on_interact);
        assert_eq!(cfg.slide_transition, Duration::from_millis(400));
        assert_eq!(cfg.thumbs_transition, Duration::from_millis(500));
        assert!(cfg.gallery_controls_id.is_none());
    }

    #[test]
    fn negative_set_size_falls_back_to_default() {
        let cfg = GalleryConfig {
            set_size: Some(-2),
            ..GalleryConfig::default()
        };
        assert_eq!(cfg.initial_set_size(), GalleryConfig::DEFAULT_SET_SIZE);
    }

    #[test]
    fn zero_set_size_is_kept() {
        let cfg = GalleryConfig {
            set_size: Some(0),
            ..GalleryConfig::default()
        };
        assert_eq!(cfg.initial_set_size(), 0);
    }

    #[test]
    fn missing_ids_are_rejected() {
        let cfg = GalleryConfig::default();
        assert!(matches!(cfg.validate(), Err(GalleryError::MissingDisplayId)));

        let cfg = GalleryConfig {
            display_id: "hero".into(),
            ..GalleryConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GalleryError::MissingThumbsId { ref display_id }) if display_id == "hero"
        ));
    }
}
