use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::{
    NameValuePair, Phase, PlaygroundApi, Port, Session, SessionConfiguration, Template,
};
use crate::panels::errors::{Notification, Operation, OperationError};
use crate::panels::format::format_duration;
use crate::poll::{PollHandle, spawn_poller};

pub const NO_PUBLIC_TEMPLATE_MESSAGE: &str =
    "Can't find any public template. The templates configuration might be incorrect.";

/// Picks a public template to start a session from.
#[derive(Debug, Clone, Default)]
pub struct TemplateSelector {
    templates: Vec<(String, Template)>,
    selected: Option<usize>,
    pub notification: Notification,
}

impl TemplateSelector {
    /// Keeps public templates only and selects the first one.
    pub fn new(templates: &BTreeMap<String, Template>) -> Self {
        let templates: Vec<_> = templates
            .iter()
            .filter(|(_, template)| template.is_public())
            .map(|(id, template)| (id.clone(), template.clone()))
            .collect();
        let selected = (!templates.is_empty()).then_some(0);
        Self {
            templates,
            selected,
            notification: Notification::default(),
        }
    }

    /// Error shown instead of the list when nothing can be selected.
    pub fn error(&self) -> Option<&'static str> {
        self.selected.is_none().then_some(NO_PUBLIC_TEMPLATE_MESSAGE)
    }

    pub fn templates(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(id, t)| (id.as_str(), t))
    }

    pub fn select(&mut self, id: &str) -> bool {
        match self.templates.iter().position(|(candidate, _)| candidate == id) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<(&str, &Template)> {
        let (id, template) = self.templates.get(self.selected?)?;
        Some((id.as_str(), template))
    }

    /// Reload templates after the "no public template" error.
    pub async fn retry<A: PlaygroundApi>(&mut self, api: &A) -> bool {
        match api.get().await {
            Ok(playground) => {
                *self = Self::new(&playground.templates);
                self.error().is_none()
            }
            Err(e) => {
                warn!(event = "core.session.templates_failed", error = %e);
                self.notification
                    .set(OperationError::failed(Operation::LoadTemplates, e));
                false
            }
        }
    }

    /// Start a session from the selected template.
    pub async fn create<A: PlaygroundApi>(&mut self, api: &A, duration: Option<u64>) -> bool {
        let Some((id, _)) = self.selected() else {
            return false;
        };
        let conf = SessionConfiguration {
            template: id.to_string(),
            duration,
        };
        match api.create_session(conf).await {
            Ok(()) => {
                info!(event = "core.session.created", template = id);
                true
            }
            Err(e) => {
                warn!(event = "core.session.create_failed", template = id, error = %e);
                self.notification
                    .set(OperationError::failed(Operation::CreateSession, e));
                false
            }
        }
    }
}

/// Read-only rendering of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    pub title: String,
    /// "Started 5min 0s ago (55min 0s left)"; absent until the pod started.
    pub started: Option<String>,
    pub phase: String,
    pub env: Vec<NameValuePair>,
    pub ports: Vec<Port>,
}

impl SessionDetails {
    pub fn from_session(session: &Session) -> Self {
        let pod = &session.pod;
        let started = pod.start_time.map(|elapsed| {
            let remaining = session.duration.saturating_mul(60).saturating_sub(elapsed);
            format!(
                "Started {} ago ({} left)",
                format_duration(elapsed),
                format_duration(remaining)
            )
        });

        let mut phase = format!("Phase: {}", pod.phase);
        if let Some(message) = &pod.message {
            phase.push(' ');
            phase.push_str(message);
        }
        if let Some(reason) = &pod.reason {
            phase.push_str(&format!(" ({reason})"));
        }

        let runtime = session.template.runtime.clone().unwrap_or_default();
        Self {
            title: session.template.name.clone(),
            started,
            phase,
            env: runtime.env.unwrap_or_default(),
            ports: runtime.ports.unwrap_or_default(),
        }
    }
}

/// The user's running session with stop and connect controls.
#[derive(Debug, Clone)]
pub struct ExistingSession {
    session: Session,
    stopping: bool,
    pub notification: Notification,
}

impl ExistingSession {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            stopping: false,
            notification: Notification::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn details(&self) -> SessionDetails {
        SessionDetails::from_session(&self.session)
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    pub fn can_stop(&self) -> bool {
        !self.stopping
    }

    pub fn can_connect(&self) -> bool {
        !self.stopping && self.session.pod.phase == Phase::Running
    }

    /// Stopping disables both controls until the backend answers.
    pub async fn stop<A: PlaygroundApi>(&mut self, api: &A) -> bool {
        if !self.can_stop() {
            return false;
        }
        self.stopping = true;
        match api.delete_session().await {
            Ok(()) => {
                info!(event = "core.session.stopped");
                true
            }
            Err(e) => {
                warn!(event = "core.session.stop_failed", error = %e);
                self.stopping = false;
                self.notification
                    .set(OperationError::failed(Operation::StopSession, e));
                false
            }
        }
    }

    /// URL to open, or `None` with a notification when not connectable.
    pub fn connect(&mut self) -> Option<&str> {
        if !self.can_connect() || self.session.url.is_empty() {
            self.notification.set(OperationError::refused(
                Operation::ConnectSession,
                Operation::ConnectSession.failure_message(),
            ));
            return None;
        }
        Some(&self.session.url)
    }

    fn refresh(&mut self, session: Session) {
        self.session = session;
    }
}

/// What the session panel shows.
#[derive(Debug, Clone)]
pub enum SessionView {
    Existing(ExistingSession),
    Select(TemplateSelector),
}

/// Session home: the current session if there is one, otherwise the
/// template selector. Polls the current session.
pub struct SessionPanel {
    templates: BTreeMap<String, Template>,
    view: SessionView,
    poll: PollHandle<Option<Session>>,
}

impl SessionPanel {
    pub fn spawn<A>(api: Arc<A>, templates: BTreeMap<String, Template>, interval: Duration) -> Self
    where
        A: PlaygroundApi + 'static,
    {
        let poll = spawn_poller("current-session", interval, move || {
            let api = api.clone();
            async move { api.get_current_session().await }
        });
        let view = SessionView::Select(TemplateSelector::new(&templates));
        Self {
            templates,
            view,
            poll,
        }
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut SessionView {
        &mut self.view
    }

    /// Switch views for a freshly polled current session.
    ///
    /// A session still shown keeps its stopping flag and notification.
    pub fn apply(&mut self, current: Option<Session>) {
        match current {
            Some(session) => match &mut self.view {
                SessionView::Existing(existing) => existing.refresh(session),
                SessionView::Select(_) => {
                    self.view = SessionView::Existing(ExistingSession::new(session));
                }
            },
            None => {
                if matches!(self.view, SessionView::Existing(_)) {
                    self.view = SessionView::Select(TemplateSelector::new(&self.templates));
                }
            }
        }
    }

    pub fn sync(&mut self) -> bool {
        match self.poll.take_update() {
            Some(current) => {
                self.apply(current);
                true
            }
            None => false,
        }
    }

    pub async fn next_update(&mut self) -> bool {
        match self.poll.changed().await {
            Some(current) => {
                self.apply(current);
                true
            }
            None => false,
        }
    }

    pub async fn close(self) {
        self.poll.shutdown().await;
    }
}
