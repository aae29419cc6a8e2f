use std::fmt;
use std::sync::Arc;

/// Identity of a gallery's display surface (the `display-id` of its config block).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(Arc<str>);

impl DisplayId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DisplayId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which way an incoming slide travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Content moves leftward; the incoming slide is appended.
    Next,
    /// Content moves rightward; the incoming slide is prepended.
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEventKind {
    Next,
    Previous,
    Change,
    Close,
}

impl GalleryEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Next => "GalleryNext",
            Self::Previous => "GalleryPrev",
            Self::Change => "GalleryChange",
            Self::Close => "GalleryClose",
        }
    }
}

impl fmt::Display for GalleryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification fanned out to subscribers of a gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEvent {
    pub kind: GalleryEventKind,
    pub gallery: DisplayId,
    /// Current slide at the time the event fired (`None` before the first open).
    pub current_index: Option<usize>,
    pub current_page: usize,
}

/// A manual control interaction. Subject to the clear-on-interact policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    SelectThumb(usize),
    Close,
    Next,
    Previous,
    NextPage,
    PreviousPage,
}

/// Requests accepted by a running gallery task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryCommand {
    Interact(Control),
    Open { index: usize, direction: Direction },
    Close,
    Next,
    Previous,
    Reset,
    NextPage,
    PreviousPage,
    SetSetSize(i64),
    StartAutoRotate,
    ClearAutoRotate,
}

/// Fired by the auto-rotate timer; stale generations are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub generation: u64,
}
