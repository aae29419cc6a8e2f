use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Configuration, GalleryConfig};
use crate::registry::Registry;
use crate::surface::Surface;
use crate::tasks::gallery::GalleryTask;

/// Galleries started from one configuration.
pub struct Started {
    pub registry: Registry,
    pub tasks: JoinSet<Result<()>>,
}

/// Build, initialize, register and spawn every configured gallery.
///
/// Must be called from within a tokio runtime.
pub fn start<S, F>(cfg: &Configuration, mut make_surface: F, cancel: &CancellationToken) -> Result<Started>
where
    S: Surface + Send + 'static,
    F: FnMut(&GalleryConfig) -> Result<S>,
{
    let mut registry = Registry::new();
    let mut tasks = JoinSet::new();

    for gallery_cfg in &cfg.galleries {
        let surface = make_surface(gallery_cfg).with_context(|| {
            format!("failed to build surface for gallery {}", gallery_cfg.display_id)
        })?;
        let mut task = GalleryTask::new(gallery_cfg, surface)
            .with_context(|| format!("failed to construct gallery {}", gallery_cfg.display_id))?;
        task.gallery_mut().init();
        registry.register(&task.handle());

        let cancel = cancel.clone();
        let display = gallery_cfg.display_id.clone();
        tasks.spawn(async move {
            task.run(cancel)
                .await
                .with_context(|| format!("gallery {display} failed"))
        });
    }

    info!(galleries = registry.len(), "galleries started");
    Ok(Started { registry, tasks })
}
