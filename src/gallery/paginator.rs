use std::time::Duration;

use tracing::{debug, warn};

use super::transition::{Ticket, TransitionLock};
use crate::error::{GalleryError, Result};
use crate::surface::{Surface, Track};

/// Page a slide change moves the thumbnail strip to, if any.
///
/// Rules are tried in order: the index starts a set; the index ends a set; the index is the last
/// slide; the index's natural page differs from `current_page`. Stepping backwards through the
/// middle of a set does not re-paginate until one of these fires.
pub fn page_for_index(
    index: usize,
    set_size: usize,
    total: usize,
    current_page: usize,
) -> Option<usize> {
    if set_size == 0 {
        return None;
    }
    let remainder = index % set_size;
    if remainder == 0 {
        Some(index / set_size)
    } else if remainder == set_size - 1 {
        Some((index + 1) / set_size - 1)
    } else if index + 1 == total {
        Some((index - remainder) / set_size)
    } else if index / set_size != current_page {
        Some(index / set_size)
    } else {
        None
    }
}

/// Owns the thumbnail page window and its transition lock.
#[derive(Debug)]
pub struct ThumbPaginator {
    set_size: usize,
    current_page: usize,
    lock: TransitionLock<usize>,
    duration: Duration,
}

impl ThumbPaginator {
    pub fn new(set_size: usize, duration: Duration) -> Self {
        Self {
            set_size,
            current_page: 0,
            lock: TransitionLock::new(),
            duration,
        }
    }

    pub fn set_size(&self) -> usize {
        self.set_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn is_transitioning(&self) -> bool {
        self.lock.is_busy()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn page_count(&self, total: usize) -> usize {
        if self.set_size == 0 {
            0
        } else {
            total.div_ceil(self.set_size)
        }
    }

    /// Strip offset, in pixels, that shows `page`.
    pub fn offset_for(&self, page: usize, thumb_width: f64) -> f64 {
        -((page * self.set_size) as f64 * thumb_width)
    }

    /// Change the set size and realign the strip on the page holding `current`.
    ///
    /// An in-flight page transition is superseded; its completion will be ignored.
    pub fn set_set_size<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        set_size: i64,
        current: Option<usize>,
    ) -> Result<Option<Ticket>> {
        let Ok(size) = usize::try_from(set_size) else {
            warn!(
                requested = set_size,
                kept = self.set_size,
                "could not set set-size; a non-negative value is required"
            );
            return Err(GalleryError::InvalidSetSize(set_size));
        };
        let before = (self.set_size, self.current_page);
        self.set_size = size;
        let page = match current {
            Some(index) if size > 0 => {
                (index / size).min(self.page_count(surface.slide_count()).saturating_sub(1))
            }
            _ => 0,
        };
        if (size, page) == before && !self.is_transitioning() {
            return Ok(None);
        }
        self.lock.abandon();
        self.current_page = page;
        Ok(self.move_to(surface, page))
    }

    /// Sync selection and page window after the current slide changed.
    pub fn on_slide_changed<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        index: usize,
    ) -> Option<Ticket> {
        surface.mark_selected(index);

        if self.set_size == 0 || self.is_transitioning() {
            return None;
        }
        let page = page_for_index(
            index,
            self.set_size,
            surface.slide_count(),
            self.current_page,
        )?;
        self.current_page = page;
        self.move_to(surface, page)
    }

    pub fn next_page<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<Ticket> {
        if self.is_transitioning() {
            debug!("next page: thumbs transition in flight; ignoring");
            return None;
        }
        let pages = self.page_count(surface.slide_count());
        if pages == 0 {
            return None;
        }
        self.current_page = (self.current_page + 1) % pages;
        self.move_to(surface, self.current_page)
    }

    pub fn previous_page<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<Ticket> {
        if self.is_transitioning() {
            debug!("previous page: thumbs transition in flight; ignoring");
            return None;
        }
        let pages = self.page_count(surface.slide_count());
        if pages == 0 {
            return None;
        }
        self.current_page = match self.current_page.checked_sub(1) {
            Some(page) => page.min(pages - 1),
            None => pages - 1,
        };
        self.move_to(surface, self.current_page)
    }

    pub fn settle(&mut self, ticket: Ticket) -> bool {
        self.lock.finish(ticket).is_some()
    }

    fn move_to<S: Surface + ?Sized>(&mut self, surface: &mut S, page: usize) -> Option<Ticket> {
        let ticket = self.lock.begin(page)?;
        let offset = self.offset_for(page, surface.thumb_width());
        debug!(page, offset, "paginating thumbnails");
        surface.animate(Track::Thumbs, offset, self.duration);
        Some(ticket)
    }
}
