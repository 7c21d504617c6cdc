use std::future::Future;

use tokio::sync::OnceCell;

use crate::spotify::player::PlayerCommand;

/// A player that plays audio somewhere and reports back through events.
///
/// Implementations push [`WidgetEvent`]s to whoever owns the bridge; the
/// methods here only start work and never wait for confirmation.
///
/// [`WidgetEvent`]: crate::playback::WidgetEvent
pub trait PlaybackWidget: Send + Sync {
    fn connect(&self);
    fn disconnect(&self);
    fn command(&self, command: PlayerCommand);
}

/// Resolves the widget's prerequisites exactly once.
///
/// A second `load` after a successful one is a no-op returning the value of
/// the first. A failed load leaves the loader empty so it can be retried.
pub struct WidgetLoader<T> {
    cell: OnceCell<T>,
}

impl<T> Default for WidgetLoader<T> {
    fn default() -> Self {
        WidgetLoader {
            cell: OnceCell::new(),
        }
    }
}

impl<T> WidgetLoader<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<E, F, Fut>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell.get_or_try_init(init).await
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
