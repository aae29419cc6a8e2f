use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::select;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;
use tracing::{debug, info, instrument};

use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::events::{DisplayId, GalleryCommand, GalleryEvent, TimerTick};
use crate::gallery::transition::Ticket;
use crate::gallery::{Gallery, Scheduled};
use crate::surface::{MountId, Surface};

/// Delay standing in for "the next rendering opportunity".
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const COMMAND_CAPACITY: usize = 32;
const TICK_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Due {
    Slide(Ticket),
    Thumbs(Ticket),
    Frame(MountId),
}

/// Cloneable entry point to a running gallery.
#[derive(Debug, Clone)]
pub struct GalleryHandle {
    id: DisplayId,
    commands: mpsc::Sender<GalleryCommand>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryHandle {
    pub fn id(&self) -> &DisplayId {
        &self.id
    }

    pub async fn send(&self, command: GalleryCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .with_context(|| format!("gallery {} is no longer running", self.id))
    }

    /// Blocking variant for callers outside the runtime (e.g. a stdin reader thread).
    pub fn blocking_send(&self, command: GalleryCommand) -> Result<()> {
        self.commands
            .blocking_send(command)
            .with_context(|| format!("gallery {} is no longer running", self.id))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    pub fn downgrade(&self) -> WeakGalleryHandle {
        WeakGalleryHandle {
            id: self.id.clone(),
            commands: self.commands.downgrade(),
            events: self.events.clone(),
        }
    }
}

/// Lookup-only reference; does not keep the gallery task's channel alive.
#[derive(Debug, Clone)]
pub struct WeakGalleryHandle {
    id: DisplayId,
    commands: mpsc::WeakSender<GalleryCommand>,
    events: broadcast::Sender<GalleryEvent>,
}

impl WeakGalleryHandle {
    pub fn id(&self) -> &DisplayId {
        &self.id
    }

    pub fn upgrade(&self) -> Option<GalleryHandle> {
        Some(GalleryHandle {
            id: self.id.clone(),
            commands: self.commands.upgrade()?,
            events: self.events.clone(),
        })
    }
}

/// A gallery plus the channels its event loop listens on.
pub struct GalleryTask<S> {
    gallery: Gallery<S>,
    handle: GalleryHandle,
    commands: mpsc::Receiver<GalleryCommand>,
    ticks: mpsc::Receiver<TimerTick>,
}

impl<S> GalleryTask<S>
where
    S: Surface + Send + 'static,
{
    pub fn new(cfg: &GalleryConfig, surface: S) -> Result<Self, GalleryError> {
        let (tick_tx, ticks) = mpsc::channel(TICK_CAPACITY);
        let (command_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let gallery = Gallery::new(cfg, surface, tick_tx)?;
        let handle = GalleryHandle {
            id: gallery.id().clone(),
            commands: command_tx,
            events: gallery.event_sender(),
        };
        Ok(Self {
            gallery,
            handle,
            commands,
            ticks,
        })
    }

    pub fn handle(&self) -> GalleryHandle {
        self.handle.clone()
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery<S> {
        &mut self.gallery
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run(cancel))
    }

    /// Serialize commands, timer ticks and animation completions for one gallery.
    ///
    /// The task keeps its own handle, so registry lookups succeed exactly while it runs.
    #[instrument(skip_all, fields(display = %self.handle.id))]
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let Self {
            mut gallery,
            handle: _handle,
            mut commands,
            mut ticks,
        } = self;
        let mut due: DelayQueue<Due> = DelayQueue::new();
        enqueue(&mut gallery, &mut due);
        info!("gallery task started");

        loop {
            select! {
                _ = cancel.cancelled() => {
                    info!("cancel received; stopping gallery");
                    break;
                }

                Some(command) = commands.recv() => gallery.handle(command),

                Some(tick) = ticks.recv() => gallery.on_timer_tick(tick),

                Some(expired) = due.next(), if !due.is_empty() => match expired.into_inner() {
                    Due::Slide(ticket) => gallery.complete_slide_transition(ticket),
                    Due::Thumbs(ticket) => gallery.complete_thumbs_transition(ticket),
                    Due::Frame(mount) => gallery.run_frame(mount),
                },
            }
            enqueue(&mut gallery, &mut due);
        }

        gallery.clear_auto_rotate_interval();
        Ok(())
    }
}

fn enqueue<S: Surface>(gallery: &mut Gallery<S>, due: &mut DelayQueue<Due>) {
    for item in gallery.take_scheduled() {
        let (entry, after) = match item {
            Scheduled::SlideSettled { ticket, after } => (Due::Slide(ticket), after),
            Scheduled::ThumbsSettled { ticket, after } => (Due::Thumbs(ticket), after),
            Scheduled::Frame(mount) => (Due::Frame(mount), FRAME_INTERVAL),
        };
        debug!(?entry, after_ms = after.as_millis() as u64, "scheduling completion");
        due.insert(entry, after);
    }
}
