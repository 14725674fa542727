use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

/// The navigation layer's "send the user back to login" action.
///
/// Must be idempotent and callable from any request context.
pub trait Navigator: Send + Sync {
    fn reset_to_login(&self);
}

impl<F> Navigator for F
where
    F: Fn() + Send + Sync,
{
    fn reset_to_login(&self) {
        self()
    }
}

/// Navigator that does nothing, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn reset_to_login(&self) {}
}

/// A navigator slot the UI fills in once its navigation tree is ready.
///
/// Resets requested before `mount` (or after `unmount`) are dropped.
#[derive(Default)]
pub struct NavigationHandle {
    target: RwLock<Option<Arc<dyn Navigator>>>,
}

impl NavigationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, navigator: Arc<dyn Navigator>) {
        if let Ok(mut target) = self.target.write() {
            *target = Some(navigator);
        }
    }

    pub fn unmount(&self) {
        if let Ok(mut target) = self.target.write() {
            *target = None;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.target.read().map(|t| t.is_some()).unwrap_or(false)
    }
}

impl Navigator for NavigationHandle {
    fn reset_to_login(&self) {
        // Clone out so the navigator runs without the lock held
        let target = self.target.read().ok().and_then(|t| t.clone());
        match target {
            Some(navigator) => navigator.reset_to_login(),
            None => debug!("Navigation not mounted, ignoring reset to login"),
        }
    }
}

impl fmt::Debug for NavigationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}
