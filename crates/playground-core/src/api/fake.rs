//! In-memory [`PlaygroundApi`] for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::client::{ApiResult, PlaygroundApi};
use crate::api::errors::ApiError;
use crate::api::types::{
    Configuration, InstanceDetails, Playground, Session, SessionConfiguration, SessionDefaults,
    User, UserConfiguration, UserUpdateConfiguration,
};

#[derive(Default)]
pub(crate) struct FakeApi {
    pub users: Mutex<BTreeMap<String, User>>,
    pub sessions: Mutex<BTreeMap<String, Session>>,
    pub current_session: Mutex<Option<Session>>,
    pub playground: Mutex<Option<Playground>>,
    /// Consumed front to back by `get_details`; the last entry repeats.
    pub details: Mutex<VecDeque<ApiResult<InstanceDetails>>>,
    pub fail_mutations: Mutex<bool>,
    pub list_users_calls: AtomicUsize,
    pub details_calls: AtomicUsize,
    pub created_sessions: Mutex<Vec<SessionConfiguration>>,
    pub deleted_sessions: AtomicUsize,
}

impl FakeApi {
    pub fn with_users(users: impl IntoIterator<Item = (&'static str, User)>) -> Self {
        let fake = Self::default();
        *fake.users.lock().unwrap() = users
            .into_iter()
            .map(|(id, user)| (id.to_string(), user))
            .collect();
        fake
    }

    pub fn push_details(&self, details: ApiResult<InstanceDetails>) {
        self.details.lock().unwrap().push_back(details);
    }

    pub fn fail_mutations(&self) {
        *self.fail_mutations.lock().unwrap() = true;
    }

    fn check_mutation(&self) -> ApiResult<()> {
        if *self.fail_mutations.lock().unwrap() {
            Err(ApiError::Server {
                message: "rejected".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn clone_result(result: &ApiResult<InstanceDetails>) -> ApiResult<InstanceDetails> {
    match result {
        Ok(details) => Ok(details.clone()),
        Err(e) => Err(ApiError::Server {
            message: e.to_string(),
        }),
    }
}

impl PlaygroundApi for FakeApi {
    async fn list_sessions(&self) -> ApiResult<BTreeMap<String, Session>> {
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn list_users(&self) -> ApiResult<BTreeMap<String, User>> {
        self.list_users_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_current_session(&self) -> ApiResult<Option<Session>> {
        Ok(self.current_session.lock().unwrap().clone())
    }

    async fn create_user(&self, id: &str, conf: UserConfiguration) -> ApiResult<()> {
        self.check_mutation()?;
        self.users.lock().unwrap().insert(id.to_string(), conf.into());
        Ok(())
    }

    async fn update_user(&self, id: &str, conf: UserUpdateConfiguration) -> ApiResult<()> {
        self.check_mutation()?;
        self.users.lock().unwrap().insert(id.to_string(), conf.into());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> ApiResult<()> {
        self.check_mutation()?;
        self.users.lock().unwrap().remove(id);
        Ok(())
    }

    async fn get(&self) -> ApiResult<Playground> {
        Ok(self.playground.lock().unwrap().clone().unwrap_or(Playground {
            configuration: Configuration {
                session_defaults: SessionDefaults { duration: 60 },
            },
            templates: BTreeMap::new(),
            user: None,
        }))
    }

    async fn get_details(&self) -> ApiResult<InstanceDetails> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.details.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Ok(InstanceDetails::default()))
        } else {
            queue
                .front()
                .map(clone_result)
                .unwrap_or_else(|| Ok(InstanceDetails::default()))
        }
    }

    async fn create_session(&self, conf: SessionConfiguration) -> ApiResult<()> {
        self.check_mutation()?;
        self.created_sessions.lock().unwrap().push(conf);
        Ok(())
    }

    async fn delete_session(&self) -> ApiResult<()> {
        self.check_mutation()?;
        self.deleted_sessions.fetch_add(1, Ordering::SeqCst);
        *self.current_session.lock().unwrap() = None;
        Ok(())
    }
}
