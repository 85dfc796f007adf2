use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiResult, Configuration, PlaygroundApi, Session, Template, User};
use crate::poll::{PollHandle, spawn_poller};
use crate::snapshot::{ResourceStore, ResourceView, Snapshot};

/// Tabs of the admin console, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Details,
    Templates,
    Users,
    Sessions,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Details,
        AdminTab::Templates,
        AdminTab::Users,
        AdminTab::Sessions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Details => "Details",
            AdminTab::Templates => "Templates",
            AdminTab::Users => "Users",
            AdminTab::Sessions => "Sessions",
        }
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdminTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminTab::ALL
            .into_iter()
            .find(|tab| tab.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown admin tab '{s}'"))
    }
}

/// Global configuration summary.
#[derive(Debug, Clone, Default)]
pub struct DetailsPanel {
    configuration: Option<Configuration>,
}

impl DetailsPanel {
    pub fn apply(&mut self, configuration: Configuration) {
        self.configuration = Some(configuration);
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    pub fn summary(&self) -> String {
        match &self.configuration {
            Some(c) => format!(
                "Default duration: {} minutes",
                c.session_defaults.duration
            ),
            None => "Default duration: unknown".to_string(),
        }
    }
}

/// A polled resource table.
///
/// Owns its poller: dropping the panel stops polling. A panel built with
/// [`ResourcePanel::with_snapshot`] has no poller and only changes through
/// local patches.
pub struct ResourcePanel<T> {
    store: ResourceStore<T>,
    poll: Option<PollHandle<Snapshot<T>>>,
}

impl<T> ResourcePanel<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn spawn<F, Fut>(label: &'static str, interval: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<BTreeMap<String, T>>> + Send + 'static,
    {
        let poll = spawn_poller(label, interval, move || {
            let fut = fetch();
            async move { fut.await.map(Snapshot::from) }
        });
        Self {
            store: ResourceStore::new(label),
            poll: Some(poll),
        }
    }

    pub fn with_snapshot(label: &'static str, snapshot: Snapshot<T>) -> Self {
        let mut store = ResourceStore::new(label);
        store.replace(snapshot);
        Self { store, poll: None }
    }

    /// Apply a snapshot polled since the last sync. Returns true if one was applied.
    pub fn sync(&mut self) -> bool {
        match self.poll.as_mut().and_then(PollHandle::take_update) {
            Some(snapshot) => {
                self.store.replace(snapshot);
                true
            }
            None => false,
        }
    }

    /// Wait for the next polled snapshot and apply it. False once polling stopped.
    pub async fn next_update(&mut self) -> bool {
        let Some(poll) = self.poll.as_mut() else {
            return false;
        };
        match poll.changed().await {
            Some(snapshot) => {
                self.store.replace(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> ResourceView<'_, T> {
        self.store.view()
    }

    pub fn store(&self) -> &ResourceStore<T> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResourceStore<T> {
        &mut self.store
    }

    pub async fn close(self) {
        if let Some(poll) = self.poll {
            poll.shutdown().await;
        }
    }
}

pub fn sessions_panel<A>(api: Arc<A>, interval: Duration) -> ResourcePanel<Session>
where
    A: PlaygroundApi + 'static,
{
    ResourcePanel::spawn("Sessions", interval, move || {
        let api = api.clone();
        async move { api.list_sessions().await }
    })
}

pub fn users_resource<A>(api: Arc<A>, interval: Duration) -> ResourcePanel<User>
where
    A: PlaygroundApi + 'static,
{
    ResourcePanel::spawn("Users", interval, move || {
        let api = api.clone();
        async move { api.list_users().await }
    })
}

/// Templates come from the root endpoint.
pub fn templates_panel<A>(api: Arc<A>, interval: Duration) -> ResourcePanel<Template>
where
    A: PlaygroundApi + 'static,
{
    ResourcePanel::spawn("Templates", interval, move || {
        let api = api.clone();
        async move { api.get().await.map(|playground| playground.templates) }
    })
}
