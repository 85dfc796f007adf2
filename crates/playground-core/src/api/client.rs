use std::collections::BTreeMap;
use std::future::Future;

use crate::api::errors::ApiError;
use crate::api::types::{
    InstanceDetails, Playground, Session, SessionConfiguration, User, UserConfiguration,
    UserUpdateConfiguration,
};

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the console needs from the playground backend.
///
/// The backend owns the transport and schema; everything in this crate talks
/// to it through this trait so pollers, panels and the reconciler can be
/// driven by an in-memory implementation in tests.
pub trait PlaygroundApi: Send + Sync {
    /// All running sessions, keyed by session id (admin only).
    fn list_sessions(&self) -> impl Future<Output = ApiResult<BTreeMap<String, Session>>> + Send;

    /// All registered users, keyed by user id (admin only).
    fn list_users(&self) -> impl Future<Output = ApiResult<BTreeMap<String, User>>> + Send;

    /// Session of the logged-in user, if one is running.
    fn get_current_session(&self) -> impl Future<Output = ApiResult<Option<Session>>> + Send;

    fn create_user(
        &self,
        id: &str,
        conf: UserConfiguration,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn update_user(
        &self,
        id: &str,
        conf: UserUpdateConfiguration,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn delete_user(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// Configuration, templates and the logged-in user.
    fn get(&self) -> impl Future<Output = ApiResult<Playground>> + Send;

    /// Status of the instance backing the current session.
    fn get_details(&self) -> impl Future<Output = ApiResult<InstanceDetails>> + Send;

    fn create_session(
        &self,
        conf: SessionConfiguration,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    /// Stop the current session.
    fn delete_session(&self) -> impl Future<Output = ApiResult<()>> + Send;
}
