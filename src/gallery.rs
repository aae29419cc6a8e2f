//! One slideshow instance: slide controller, thumbnail paginator and auto-rotate timer over a
//! single [`Surface`].
//!
//! All methods are synchronous. Work that has to finish later (animation completions, the
//! next-frame cleanup pass) is queued as [`Scheduled`] entries which the owning task drains with
//! [`Gallery::take_scheduled`] and feeds back through the `complete_*`/`run_frame` methods.

pub mod controller;
pub mod paginator;
pub mod timer;
pub mod transition;

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::events::{
    Control, Direction, DisplayId, GalleryCommand, GalleryEvent, GalleryEventKind, TimerTick,
};
use crate::surface::{MountId, Region, Surface};
use controller::{Incoming, Opened, SlideController};
use paginator::ThumbPaginator;
use timer::AutoRotateTimer;
use transition::Ticket;

const EVENT_CAPACITY: usize = 64;

/// Deferred work requested by the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// Slide animation finishes after `after`.
    SlideSettled { ticket: Ticket, after: Duration },
    /// Thumbnail strip animation finishes after `after`.
    ThumbsSettled { ticket: Ticket, after: Duration },
    /// Cleanup pass at the next rendering opportunity, promoting the given slide element.
    Frame(MountId),
}

pub struct Gallery<S> {
    id: DisplayId,
    surface: S,
    controller: SlideController,
    paginator: ThumbPaginator,
    timer: AutoRotateTimer,
    has_thumbs_controls: bool,
    events: broadcast::Sender<GalleryEvent>,
    scheduled: Vec<Scheduled>,
}

impl<S: Surface> Gallery<S> {
    pub fn new(
        cfg: &GalleryConfig,
        surface: S,
        ticks: mpsc::Sender<TimerTick>,
    ) -> Result<Self> {
        cfg.validate()?;
        if surface.slide_count() == 0 {
            return Err(GalleryError::EmptySlideSet(cfg.display_id.clone()));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            id: cfg.display(),
            surface,
            controller: SlideController::new(
                cfg.slide_transition,
                cfg.gallery_controls_id.is_some(),
            ),
            paginator: ThumbPaginator::new(cfg.initial_set_size(), cfg.thumbs_transition),
            timer: AutoRotateTimer::new(
                cfg.auto_rotate_interval(),
                cfg.clear_auto_rotate_on_interact,
                ticks,
            ),
            has_thumbs_controls: cfg.thumbs_controls_id.is_some(),
            events,
            scheduled: Vec::new(),
        })
    }

    pub fn id(&self) -> &DisplayId {
        &self.id
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<GalleryEvent> {
        self.events.clone()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.controller.current_index()
    }

    pub fn current_page(&self) -> usize {
        self.paginator.current_page()
    }

    pub fn set_size(&self) -> usize {
        self.paginator.set_size()
    }

    pub fn is_transitioning(&self) -> bool {
        self.controller.is_transitioning()
    }

    pub fn is_paginating(&self) -> bool {
        self.paginator.is_transitioning()
    }

    pub fn auto_rotate_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Show the first slide and start auto-rotation.
    pub fn init(&mut self) {
        info!(
            display = %self.id,
            slides = self.surface.slide_count(),
            set_size = self.paginator.set_size(),
            auto_rotate = %humantime::format_duration(self.timer.interval()),
            "initializing gallery"
        );
        self.next();
        self.start_auto_rotate();
    }

    pub fn open(&mut self, index: usize, direction: Direction) {
        let opened = self.controller.open(&mut self.surface, index, direction);
        self.apply(opened);
    }

    pub fn next(&mut self) {
        if self.controller.is_transitioning() {
            debug!(display = %self.id, "next ignored; slide transition in flight");
            return;
        }
        let opened = self.controller.next(&mut self.surface);
        self.apply(opened);
        self.emit(GalleryEventKind::Next);
    }

    pub fn previous(&mut self) {
        if self.controller.is_transitioning() {
            debug!(display = %self.id, "previous ignored; slide transition in flight");
            return;
        }
        let opened = self.controller.previous(&mut self.surface);
        self.apply(opened);
        self.emit(GalleryEventKind::Previous);
    }

    /// Back to the first slide as if freshly initialized. Overrides an in-flight slide transition.
    pub fn reset(&mut self) {
        self.controller.rewind();
        self.timer.clear();
        self.next();
        self.start_auto_rotate();
    }

    pub fn close(&mut self) {
        self.surface.hide(Region::Display);
        self.surface.hide(Region::GalleryControls);
        self.surface.show(Region::Thumbs);
        self.emit(GalleryEventKind::Close);
    }

    /// Open the slide behind a clicked thumbnail.
    pub fn select_thumb(&mut self, index: usize) {
        if self.controller.is_transitioning() || self.controller.current_index() == Some(index) {
            return;
        }
        if self.timer.clear_on_interact() {
            self.timer.clear();
        }
        let direction = match self.controller.current_index() {
            Some(current) if index < current => Direction::Previous,
            _ => Direction::Next,
        };
        self.open(index, direction);
    }

    pub fn next_page(&mut self) {
        if let Some(ticket) = self.paginator.next_page(&mut self.surface) {
            self.schedule_thumbs(ticket);
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(ticket) = self.paginator.previous_page(&mut self.surface) {
            self.schedule_thumbs(ticket);
        }
    }

    /// Change how many thumbnails a page holds; the strip follows the current slide.
    pub fn set_set_size(&mut self, set_size: i64) -> Result<()> {
        let current = self.controller.current_index();
        if let Some(ticket) = self
            .paginator
            .set_set_size(&mut self.surface, set_size, current)?
        {
            self.schedule_thumbs(ticket);
        }
        Ok(())
    }

    pub fn start_auto_rotate(&mut self) {
        self.timer.start();
    }

    pub fn clear_auto_rotate_interval(&mut self) {
        self.timer.clear();
    }

    /// Handle a manual control, cancelling auto-rotation first when configured to.
    pub fn interact(&mut self, control: Control) {
        match control {
            Control::SelectThumb(index) => {
                self.select_thumb(index);
                return;
            }
            Control::NextPage | Control::PreviousPage if !self.has_thumbs_controls => {
                debug!(display = %self.id, ?control, "no thumbs controls configured; ignoring");
                return;
            }
            _ => {}
        }
        if self.timer.clear_on_interact() {
            self.timer.clear();
        }
        match control {
            Control::Close => self.close(),
            Control::Next => self.next(),
            Control::Previous => self.previous(),
            Control::NextPage => self.next_page(),
            Control::PreviousPage => self.previous_page(),
            Control::SelectThumb(_) => {}
        }
    }

    pub fn handle(&mut self, command: GalleryCommand) {
        debug!(display = %self.id, ?command, "gallery command");
        match command {
            GalleryCommand::Interact(control) => self.interact(control),
            GalleryCommand::Open { index, direction } => self.open(index, direction),
            GalleryCommand::Close => self.close(),
            GalleryCommand::Next => self.next(),
            GalleryCommand::Previous => self.previous(),
            GalleryCommand::Reset => self.reset(),
            GalleryCommand::NextPage => self.next_page(),
            GalleryCommand::PreviousPage => self.previous_page(),
            GalleryCommand::SetSetSize(size) => {
                if let Err(err) = self.set_set_size(size) {
                    warn!(display = %self.id, "{err}");
                }
            }
            GalleryCommand::StartAutoRotate => self.start_auto_rotate(),
            GalleryCommand::ClearAutoRotate => self.clear_auto_rotate_interval(),
        }
    }

    pub fn on_timer_tick(&mut self, tick: TimerTick) {
        if !self.timer.accepts(tick) {
            debug!(display = %self.id, generation = tick.generation, "dropping stale auto-rotate tick");
            return;
        }
        self.next();
    }

    pub fn complete_slide_transition(&mut self, ticket: Ticket) {
        if let Some(incoming) = self.controller.settle(&mut self.surface, ticket) {
            self.after_slide_change(incoming);
        }
    }

    pub fn complete_thumbs_transition(&mut self, ticket: Ticket) {
        if !self.paginator.settle(ticket) {
            debug!(display = %self.id, ?ticket, "stale thumbs transition completion");
        }
    }

    /// Cosmetic cleanup after a completion: drop leftover settled slides and promote `mount`.
    ///
    /// Elements of a transition started since the completion are left alone.
    pub fn run_frame(&mut self, mount: MountId) {
        self.surface.remove_settled_slides();
        self.surface.settle_incoming(mount);
    }

    pub fn take_scheduled(&mut self) -> Vec<Scheduled> {
        std::mem::take(&mut self.scheduled)
    }

    fn apply(&mut self, opened: Opened) {
        match opened {
            Opened::Ignored => {}
            Opened::Animating(ticket) => self.scheduled.push(Scheduled::SlideSettled {
                ticket,
                after: self.controller.duration(),
            }),
            Opened::Settled(incoming) => self.after_slide_change(incoming),
        }
    }

    fn after_slide_change(&mut self, incoming: Incoming) {
        if let Some(ticket) = self
            .paginator
            .on_slide_changed(&mut self.surface, incoming.index)
        {
            self.schedule_thumbs(ticket);
        }
        self.emit(GalleryEventKind::Change);
        self.scheduled.push(Scheduled::Frame(incoming.mount));
    }

    fn schedule_thumbs(&mut self, ticket: Ticket) {
        self.scheduled.push(Scheduled::ThumbsSettled {
            ticket,
            after: self.paginator.duration(),
        });
    }

    fn emit(&self, kind: GalleryEventKind) {
        let event = GalleryEvent {
            kind,
            gallery: self.id.clone(),
            current_index: self.controller.current_index(),
            current_page: self.paginator.current_page(),
        };
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
