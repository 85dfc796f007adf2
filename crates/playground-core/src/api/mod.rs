//! Client side of the playground backend.
//!
//! [`PlaygroundApi`] is the seam every other module depends on;
//! [`HttpClient`] is the production implementation.

pub mod client;
pub mod errors;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{ApiResult, PlaygroundApi};
pub use errors::ApiError;
pub use http::HttpClient;
pub use types::{
    Configuration, ContainerState, ContainerStateWaiting, ContainerStatus, Instance,
    InstanceDetails, InstancePod, NameValuePair, Phase, Playground, PlaygroundUser, Pod,
    PodDetails, PodStatus, Port, RuntimeConfiguration, Session, SessionConfiguration,
    SessionDefaults, Template, User, UserConfiguration, UserUpdateConfiguration,
};
