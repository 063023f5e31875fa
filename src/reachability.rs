//! Network reachability signal shared by the dispatch layer and the sync
//! engine.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;
use url::Url;

/// Cheaply cloneable online/offline flag with change notifications.
///
/// The embedding app flips the flag from its connectivity events (or calls
/// [`Reachability::probe`]); the sync engine subscribes to trigger a pass on
/// reconnect.
#[derive(Clone)]
pub struct Reachability {
    online: Arc<watch::Sender<bool>>,
}

impl Reachability {
    pub fn new(initially_online: bool) -> Self {
        let (online, _) = watch::channel(initially_online);
        Self {
            online: Arc::new(online),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.online.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
        if changed {
            info!(
                "Connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
    }

    /// Watch channel for connectivity transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Update the flag from an actual round-trip. Any HTTP response counts
    /// as reachable; only a transport failure marks the client offline.
    pub async fn probe(&self, client: &reqwest::Client, url: Url) -> bool {
        let online = client.get(url).send().await.is_ok();
        self.set_online(online);
        online
    }
}

impl Default for Reachability {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_toggles() {
        let reachability = Reachability::new(false);
        assert!(!reachability.is_online());

        reachability.set_online(true);
        assert!(reachability.is_online());
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let reachability = Reachability::new(false);
        let mut rx = reachability.subscribe();

        reachability.set_online(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn redundant_set_does_not_notify() {
        let reachability = Reachability::new(true);
        let mut rx = reachability.subscribe();

        reachability.set_online(true);
        assert!(!rx.has_changed().unwrap());
    }
}
