//! Console panel state: the admin tabs and the session home.
//!
//! Panels hold view state only (selection, open dialog, notification) on top
//! of polled resources; rendering is left to the caller.

pub mod admin;
pub mod dialog;
pub mod errors;
pub mod format;
pub mod selection;
pub mod session;
pub mod users;

pub use admin::{
    AdminTab, DetailsPanel, ResourcePanel, sessions_panel, templates_panel, users_resource,
};
pub use dialog::{DialogState, UserCreationForm, UserUpdateForm};
pub use errors::{Notification, Operation, OperationError};
pub use format::format_duration;
pub use selection::SelectionState;
pub use session::{
    ExistingSession, NO_PUBLIC_TEMPLATE_MESSAGE, SessionDetails, SessionPanel, SessionView,
    TemplateSelector,
};
pub use users::{DELETE_SELF_MESSAGE, UsersPanel};
