use std::time::Duration;

use tracing::debug;

use super::transition::{LockState, Ticket, TransitionLock};
use crate::events::Direction;
use crate::surface::{MountId, Placement, Region, Surface, Track};

/// Slide being brought in by a transition, and the element mounted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incoming {
    pub index: usize,
    pub mount: MountId,
}

/// Outcome of [`SlideController::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    /// A slide transition was already in flight, or the target does not exist.
    Ignored,
    /// First open: completed synchronously, `current_index` is now the given slide.
    Settled(Incoming),
    /// Animation started; call [`SlideController::settle`] with the ticket once it finishes.
    Animating(Ticket),
}

/// Owns the current slide index and the slide transition lock.
#[derive(Debug)]
pub struct SlideController {
    current: Option<usize>,
    lock: TransitionLock<Incoming>,
    init_call: bool,
    has_controls: bool,
    duration: Duration,
}

impl SlideController {
    pub fn new(duration: Duration, has_controls: bool) -> Self {
        Self {
            current: None,
            lock: TransitionLock::new(),
            init_call: true,
            has_controls,
            duration,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.lock.is_busy()
    }

    /// Slide currently being transitioned to, if any.
    pub fn pending_target(&self) -> Option<usize> {
        match self.lock.state() {
            LockState::Transitioning { target, .. } => Some(target.index),
            LockState::Idle => None,
        }
    }

    pub fn is_init_call(&self) -> bool {
        self.init_call
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Bring `target` into the display, travelling in `direction`.
    pub fn open<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: usize,
        direction: Direction,
    ) -> Opened {
        let Some(slide) = surface.slide(target) else {
            debug!(target, "open: no such slide; ignoring");
            return Opened::Ignored;
        };
        if self.lock.is_busy() {
            debug!(target, "open: slide transition in flight; ignoring");
            return Opened::Ignored;
        }

        if self.init_call {
            surface.clear_display();
        }

        let width = surface.display_width();
        let (placement, start, end) = match direction {
            Direction::Next => (Placement::Append, 0.0, -width),
            Direction::Previous => (Placement::Prepend, -width, 0.0),
        };
        let mount = surface.mount_slide(&slide.content(), placement);
        let Some(ticket) = self.lock.begin(Incoming { index: target, mount }) else {
            return Opened::Ignored;
        };
        surface.set_in_transition(true);
        surface.set_offset(Track::Display, start);

        let opened = if self.init_call {
            let settled = self.settle(surface, ticket);
            self.init_call = false;
            settled.map_or(Opened::Ignored, Opened::Settled)
        } else {
            surface.animate(Track::Display, end, self.duration);
            Opened::Animating(ticket)
        };

        if self.has_controls {
            surface.show(Region::GalleryControls);
        }
        surface.show(Region::Display);
        opened
    }

    /// Target of the next slide after the current one, wrapping at the end.
    pub fn next_target(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.current.map_or(0, |idx| (idx + 1) % len))
    }

    /// Target of the slide before the current one, wrapping at the start.
    pub fn previous_target(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(match self.current {
            Some(idx) if idx > 0 => (idx - 1).min(len - 1),
            _ => len - 1,
        })
    }

    pub fn next<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Opened {
        if self.is_transitioning() {
            debug!("next: slide transition in flight; ignoring");
            return Opened::Ignored;
        }
        match self.next_target(surface.slide_count()) {
            Some(target) => self.open(surface, target, Direction::Next),
            None => Opened::Ignored,
        }
    }

    pub fn previous<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Opened {
        if self.is_transitioning() {
            debug!("previous: slide transition in flight; ignoring");
            return Opened::Ignored;
        }
        match self.previous_target(surface.slide_count()) {
            Some(target) => self.open(surface, target, Direction::Previous),
            None => Opened::Ignored,
        }
    }

    /// Finish the transition identified by `ticket`. Returns the slide now current.
    pub fn settle<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        ticket: Ticket,
    ) -> Option<Incoming> {
        let Some(incoming) = self.lock.finish(ticket) else {
            debug!(?ticket, "settle: stale slide transition; ignoring");
            return None;
        };
        surface.remove_slides_except(incoming.mount);
        surface.set_offset(Track::Display, 0.0);
        surface.set_in_transition(false);
        self.current = Some(incoming.index);
        Some(incoming)
    }

    /// Back to the pre-init state. Any in-flight transition is abandoned.
    pub fn rewind(&mut self) {
        if let Some(incoming) = self.lock.abandon() {
            debug!(target = incoming.index, "rewind: abandoning in-flight slide transition");
        }
        self.current = None;
        self.init_call = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DisplayId;
    use crate::surface::{HeadlessSurface, Slide, SlideContent};

    fn surface(n: usize) -> HeadlessSurface {
        let slides = (0..n).map(|i| Slide::image(format!("{i}.jpg"))).collect();
        HeadlessSurface::new(DisplayId::new("hero"), slides, 800.0, 100.0)
    }

    fn advance(ctrl: &mut SlideController, surface: &mut HeadlessSurface) {
        match ctrl.next(surface) {
            Opened::Animating(ticket) => {
                ctrl.settle(surface, ticket).unwrap();
            }
            Opened::Settled(_) => {}
            Opened::Ignored => panic!("next was ignored"),
        }
    }

    #[test]
    fn first_open_settles_synchronously() {
        let mut surface = surface(3);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        assert_eq!(ctrl.current_index(), None);
        assert!(ctrl.is_init_call());

        assert!(matches!(
            ctrl.next(&mut surface),
            Opened::Settled(Incoming { index: 0, .. })
        ));
        assert_eq!(ctrl.current_index(), Some(0));
        assert!(!ctrl.is_init_call());
        assert!(!ctrl.is_transitioning());
        assert_eq!(surface.offset(Track::Display), 0.0);
    }

    #[test]
    fn next_direction_appends_and_moves_left() {
        let mut surface = surface(3);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        let Opened::Settled(first) = ctrl.next(&mut surface) else {
            panic!("expected synchronous first open");
        };
        surface.settle_incoming(first.mount);

        let Opened::Animating(ticket) = ctrl.next(&mut surface) else {
            panic!("expected animation");
        };
        assert!(surface.in_transition());
        assert_eq!(surface.offset(Track::Display), -800.0);
        assert_eq!(
            surface.mounted().last().unwrap().content,
            SlideContent::Image("1.jpg".into())
        );

        ctrl.settle(&mut surface, ticket);
        assert_eq!(surface.offset(Track::Display), 0.0);
        assert_eq!(surface.mounted().len(), 1);
        assert_eq!(ctrl.current_index(), Some(1));
    }

    #[test]
    fn previous_direction_prepends() {
        let mut surface = surface(3);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        let Opened::Settled(first) = ctrl.next(&mut surface) else {
            panic!("expected synchronous first open");
        };
        surface.settle_incoming(first.mount);

        let Opened::Animating(_) = ctrl.previous(&mut surface) else {
            panic!("expected animation");
        };
        assert_eq!(ctrl.pending_target(), Some(2));
        assert_eq!(
            surface.mounted().first().unwrap().content,
            SlideContent::Image("2.jpg".into())
        );
        assert!(!surface.mounted()[0].settled);
    }

    #[test]
    fn navigation_is_ignored_while_transitioning() {
        let mut surface = surface(4);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        ctrl.next(&mut surface);
        let Opened::Animating(ticket) = ctrl.next(&mut surface) else {
            panic!("expected animation");
        };

        assert_eq!(ctrl.next(&mut surface), Opened::Ignored);
        assert_eq!(ctrl.previous(&mut surface), Opened::Ignored);
        assert_eq!(ctrl.open(&mut surface, 3, Direction::Next), Opened::Ignored);
        assert_eq!(ctrl.current_index(), Some(0));

        ctrl.settle(&mut surface, ticket);
        assert_eq!(ctrl.current_index(), Some(1));
    }

    #[test]
    fn next_n_times_is_cyclic_and_previous_inverts() {
        let len = 5;
        let mut surface = surface(len);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        advance(&mut ctrl, &mut surface);
        let start = ctrl.current_index().unwrap();

        for n in 1..=12 {
            advance(&mut ctrl, &mut surface);
            assert_eq!(ctrl.current_index(), Some((start + n) % len));
        }
        for _ in 0..12 {
            let Opened::Animating(ticket) = ctrl.previous(&mut surface) else {
                panic!("expected animation");
            };
            ctrl.settle(&mut surface, ticket);
        }
        assert_eq!(ctrl.current_index(), Some(start));
    }

    #[test]
    fn previous_from_first_open_wraps_to_last() {
        let mut surface = surface(4);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        assert!(matches!(
            ctrl.previous(&mut surface),
            Opened::Settled(Incoming { index: 3, .. })
        ));
    }

    #[test]
    fn rewind_discards_in_flight_completion() {
        let mut surface = surface(4);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        ctrl.next(&mut surface);
        let Opened::Animating(stale) = ctrl.next(&mut surface) else {
            panic!("expected animation");
        };

        ctrl.rewind();
        assert!(matches!(
            ctrl.next(&mut surface),
            Opened::Settled(Incoming { index: 0, .. })
        ));
        assert_eq!(ctrl.settle(&mut surface, stale), None);
        assert_eq!(ctrl.current_index(), Some(0));
    }

    #[test]
    fn completion_keeps_only_the_incoming_element() {
        let mut surface = surface(3);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        ctrl.next(&mut surface);

        // Outgoing slide was never promoted; completion still removes it.
        let Opened::Animating(ticket) = ctrl.next(&mut surface) else {
            panic!("expected animation");
        };
        let incoming = ctrl.settle(&mut surface, ticket).unwrap();
        assert_eq!(incoming.index, 1);
        assert_eq!(surface.mounted().len(), 1);
        assert_eq!(surface.mounted()[0].id, incoming.mount);
    }

    #[test]
    fn missing_target_is_ignored() {
        let mut surface = surface(2);
        let mut ctrl = SlideController::new(Duration::from_millis(400), false);
        assert_eq!(ctrl.open(&mut surface, 9, Direction::Next), Opened::Ignored);
        assert!(!ctrl.is_transitioning());
        assert!(ctrl.is_init_call());
    }

    #[test]
    fn open_shows_configured_controls() {
        let mut surface = surface(2);
        surface.hide(Region::GalleryControls);
        surface.hide(Region::Display);
        let mut ctrl = SlideController::new(Duration::from_millis(400), true);
        ctrl.next(&mut surface);
        assert!(surface.is_visible(Region::GalleryControls));
        assert!(surface.is_visible(Region::Display));
    }
}
