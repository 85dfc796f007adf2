use tracing::{info, warn};

use crate::api::{PlaygroundApi, PlaygroundUser, User, UserConfiguration, UserUpdateConfiguration};
use crate::panels::admin::ResourcePanel;
use crate::panels::dialog::{DialogState, UserCreationForm, UserUpdateForm};
use crate::panels::errors::{Notification, Operation, OperationError};
use crate::panels::selection::SelectionState;
use crate::snapshot::{ResourceStore, ResourceView};

pub const DELETE_SELF_MESSAGE: &str = "Can't delete currently logged user";

/// Admin users table with selection, dialogs and mutations.
///
/// Mutations go to the backend first; only once the backend accepted them
/// is the local table patched. The next poll replaces the patched table.
pub struct UsersPanel {
    users: ResourcePanel<User>,
    current_user: PlaygroundUser,
    pub selection: SelectionState,
    pub dialog: DialogState,
    pub notification: Notification,
}

impl UsersPanel {
    pub fn new(users: ResourcePanel<User>, current_user: PlaygroundUser) -> Self {
        Self {
            users,
            current_user,
            selection: SelectionState::default(),
            dialog: DialogState::None,
            notification: Notification::default(),
        }
    }

    pub fn resources(&mut self) -> &mut ResourcePanel<User> {
        &mut self.users
    }

    pub fn store(&self) -> &ResourceStore<User> {
        self.users.store()
    }

    pub fn view(&self) -> ResourceView<'_, User> {
        self.users.view()
    }

    pub fn open_create_dialog(&mut self) {
        self.dialog = DialogState::open_create();
    }

    /// Opens the update dialog seeded from the selected user.
    pub fn open_update_dialog(&mut self) -> bool {
        let Some(id) = self.selection.id() else {
            return false;
        };
        let Some(user) = self.users.store().get(id).copied() else {
            return false;
        };
        self.dialog = DialogState::UpdateUser {
            form: UserUpdateForm::new(id, user),
        };
        true
    }

    pub fn can_submit_creation(&self) -> bool {
        match &self.dialog {
            DialogState::CreateUser { form } => form.can_submit(self.users.store()),
            _ => false,
        }
    }

    pub fn can_submit_update(&self) -> bool {
        match &self.dialog {
            DialogState::UpdateUser { form } => form.is_dirty(),
            _ => false,
        }
    }

    /// Submit the open creation dialog, closing it. Does nothing while create is disabled.
    pub async fn submit_creation<A: PlaygroundApi>(&mut self, api: &A) -> bool {
        let form: Option<UserCreationForm> = match &self.dialog {
            DialogState::CreateUser { form } if form.can_submit(self.users.store()) => {
                Some(form.clone())
            }
            _ => None,
        };
        let Some(form) = form else {
            return false;
        };
        self.dialog.close();
        let (id, conf) = form.submit();
        self.create_user(api, &id, conf).await
    }

    /// Submit the open update dialog, closing it. Does nothing while nothing changed.
    pub async fn submit_update<A: PlaygroundApi>(&mut self, api: &A) -> bool {
        let form = match &self.dialog {
            DialogState::UpdateUser { form } if form.is_dirty() => form.clone(),
            _ => return false,
        };
        self.dialog.close();
        let (id, conf) = form.submit();
        self.update_user(api, &id, conf).await
    }

    pub async fn create_user<A: PlaygroundApi>(
        &mut self,
        api: &A,
        id: &str,
        conf: UserConfiguration,
    ) -> bool {
        match api.create_user(id, conf).await {
            Ok(()) => {
                info!(event = "core.users.created", id = id);
                self.users.store_mut().patch_upsert(id, conf.into());
                true
            }
            Err(e) => {
                warn!(event = "core.users.create_failed", id = id, error = %e);
                self.notification
                    .set(OperationError::failed(Operation::CreateUser, e));
                false
            }
        }
    }

    pub async fn update_user<A: PlaygroundApi>(
        &mut self,
        api: &A,
        id: &str,
        conf: UserUpdateConfiguration,
    ) -> bool {
        match api.update_user(id, conf).await {
            Ok(()) => {
                info!(event = "core.users.updated", id = id);
                self.users.store_mut().patch_upsert(id, conf.into());
                true
            }
            Err(e) => {
                warn!(event = "core.users.update_failed", id = id, error = %e);
                self.notification
                    .set(OperationError::failed(Operation::UpdateUser, e));
                false
            }
        }
    }

    /// Delete the selected user. The logged-in user cannot delete themselves.
    pub async fn delete_selected<A: PlaygroundApi>(&mut self, api: &A) -> bool {
        let Some(id) = self.selection.id().map(str::to_string) else {
            return false;
        };
        if id == self.current_user.id {
            self.notification.set(OperationError::refused(
                Operation::DeleteUser,
                DELETE_SELF_MESSAGE,
            ));
            return false;
        }

        match api.delete_user(&id).await {
            Ok(()) => {
                info!(event = "core.users.deleted", id = id.as_str());
                self.users.store_mut().patch_remove(&id);
                self.selection.clear();
                true
            }
            Err(e) => {
                warn!(event = "core.users.delete_failed", id = id.as_str(), error = %e);
                self.notification
                    .set(OperationError::failed(Operation::DeleteUser, e));
                false
            }
        }
    }
}
