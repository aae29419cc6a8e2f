//! Rendering collaborator seen by the gallery core.
//!
//! A [`Surface`] stands in for the page: it knows the thumbnails, measures widths, mounts slide
//! elements into the display and moves the display and thumbnail tracks. Animation timing is
//! owned by the gallery task, so `animate` only has to start the visual effect.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::events::DisplayId;

/// One thumbnail's content reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Slide {
    pub img_src: Option<String>,
    pub dom_id: Option<String>,
}

impl Slide {
    pub fn image(src: impl Into<String>) -> Self {
        Self {
            img_src: Some(src.into()),
            dom_id: None,
        }
    }

    pub fn fragment(id: impl Into<String>) -> Self {
        Self {
            img_src: None,
            dom_id: Some(id.into()),
        }
    }

    /// Resolve what the slide renders. The image source wins when both are set.
    pub fn content(&self) -> SlideContent {
        match (self.img_src.as_deref(), self.dom_id.as_deref()) {
            (Some(src), _) if !src.is_empty() => SlideContent::Image(src.to_owned()),
            (_, Some(id)) if !id.is_empty() => SlideContent::Fragment(id.to_owned()),
            _ => SlideContent::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideContent {
    Image(String),
    /// Clone of an existing element, by id.
    Fragment(String),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Display,
    Thumbs,
    GalleryControls,
}

/// Identity of one mounted slide element, unique per surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Display,
    Thumbs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

pub trait Surface {
    /// Number of thumbnails (and therefore slides).
    fn slide_count(&self) -> usize;
    fn slide(&self, index: usize) -> Option<Slide>;
    /// Outer width of the display.
    fn display_width(&self) -> f64;
    /// Outer width of one thumbnail, margin included.
    fn thumb_width(&self) -> f64;

    fn show(&mut self, region: Region);
    fn hide(&mut self, region: Region);

    /// Drop everything currently rendered in the display.
    fn clear_display(&mut self);
    /// Insert the incoming slide element; it stays "in transition" until settled.
    fn mount_slide(&mut self, content: &SlideContent, placement: Placement) -> MountId;
    fn set_in_transition(&mut self, active: bool);
    fn set_offset(&mut self, track: Track, px: f64);
    /// Start moving `track` to `to_px`. Completion is reported by the gallery task.
    fn animate(&mut self, track: Track, to_px: f64, duration: Duration);
    /// Remove every slide element except `keep`.
    fn remove_slides_except(&mut self, keep: MountId);
    /// Remove slide elements already promoted to settled slides.
    fn remove_settled_slides(&mut self);
    /// Promote `mount` to a settled slide. Unknown ids are ignored.
    fn settle_incoming(&mut self, mount: MountId);
    /// Mark the thumbnail at `index` as selected and clear every other marker.
    fn mark_selected(&mut self, index: usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedSlide {
    pub id: MountId,
    pub content: SlideContent,
    pub settled: bool,
}

/// In-memory surface built from static markup. Logs every rendering call.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    id: DisplayId,
    slides: Vec<Slide>,
    display_width: f64,
    thumb_width: f64,
    display_visible: bool,
    thumbs_visible: bool,
    controls_visible: bool,
    in_transition: bool,
    display_offset: f64,
    thumbs_offset: f64,
    mounted: Vec<MountedSlide>,
    next_mount: u64,
    selected: Vec<bool>,
}

impl HeadlessSurface {
    pub fn new(id: DisplayId, slides: Vec<Slide>, display_width: f64, thumb_width: f64) -> Self {
        let selected = vec![false; slides.len()];
        Self {
            id,
            slides,
            display_width,
            thumb_width,
            display_visible: true,
            thumbs_visible: true,
            controls_visible: true,
            in_transition: false,
            display_offset: 0.0,
            thumbs_offset: 0.0,
            mounted: Vec::new(),
            next_mount: 0,
            selected,
        }
    }

    pub fn from_config(cfg: &crate::config::GalleryConfig) -> Self {
        Self::new(
            cfg.display(),
            cfg.markup.slides.clone(),
            cfg.markup.display_width,
            cfg.markup.thumb_width,
        )
    }

    pub fn is_visible(&self, region: Region) -> bool {
        match region {
            Region::Display => self.display_visible,
            Region::Thumbs => self.thumbs_visible,
            Region::GalleryControls => self.controls_visible,
        }
    }

    pub fn offset(&self, track: Track) -> f64 {
        match track {
            Track::Display => self.display_offset,
            Track::Thumbs => self.thumbs_offset,
        }
    }

    pub fn in_transition(&self) -> bool {
        self.in_transition
    }

    pub fn mounted(&self) -> &[MountedSlide] {
        &self.mounted
    }

    pub fn selected_thumbs(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter_map(|(idx, on)| on.then_some(idx))
            .collect()
    }

    fn region_flag(&mut self, region: Region) -> &mut bool {
        match region {
            Region::Display => &mut self.display_visible,
            Region::Thumbs => &mut self.thumbs_visible,
            Region::GalleryControls => &mut self.controls_visible,
        }
    }
}

impl Surface for HeadlessSurface {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn slide(&self, index: usize) -> Option<Slide> {
        self.slides.get(index).cloned()
    }

    fn display_width(&self) -> f64 {
        self.display_width
    }

    fn thumb_width(&self) -> f64 {
        if self.slides.is_empty() {
            0.0
        } else {
            self.thumb_width
        }
    }

    fn show(&mut self, region: Region) {
        *self.region_flag(region) = true;
    }

    fn hide(&mut self, region: Region) {
        *self.region_flag(region) = false;
    }

    fn clear_display(&mut self) {
        self.mounted.clear();
    }

    fn mount_slide(&mut self, content: &SlideContent, placement: Placement) -> MountId {
        self.next_mount += 1;
        let id = MountId(self.next_mount);
        debug!(display = %self.id, ?id, ?content, ?placement, "mount slide");
        let slide = MountedSlide {
            id,
            content: content.clone(),
            settled: false,
        };
        match placement {
            Placement::Append => self.mounted.push(slide),
            Placement::Prepend => self.mounted.insert(0, slide),
        }
        id
    }

    fn set_in_transition(&mut self, active: bool) {
        self.in_transition = active;
    }

    fn set_offset(&mut self, track: Track, px: f64) {
        match track {
            Track::Display => self.display_offset = px,
            Track::Thumbs => self.thumbs_offset = px,
        }
    }

    fn animate(&mut self, track: Track, to_px: f64, duration: Duration) {
        debug!(
            display = %self.id,
            ?track,
            to_px,
            duration_ms = duration.as_millis() as u64,
            "animate"
        );
        self.set_offset(track, to_px);
    }

    fn remove_slides_except(&mut self, keep: MountId) {
        self.mounted.retain(|slide| slide.id == keep);
    }

    fn remove_settled_slides(&mut self) {
        self.mounted.retain(|slide| !slide.settled);
    }

    fn settle_incoming(&mut self, mount: MountId) {
        if let Some(slide) = self.mounted.iter_mut().find(|slide| slide.id == mount) {
            slide.settled = true;
        }
    }

    fn mark_selected(&mut self, index: usize) {
        for (idx, flag) in self.selected.iter_mut().enumerate() {
            *flag = idx == index;
        }
    }
}
