use crate::api::{User, UserConfiguration, UserUpdateConfiguration};
use crate::snapshot::ResourceStore;

/// Form state for the user creation dialog.
#[derive(Clone, Debug, Default)]
pub struct UserCreationForm {
    /// GitHub id as typed.
    pub id: String,
    pub can_customize_duration: bool,
}

impl UserCreationForm {
    /// Ids are stored lowercase.
    pub fn normalized_id(&self) -> String {
        self.id.trim().to_lowercase()
    }

    /// Create is enabled only for a non-empty id not already present.
    pub fn can_submit(&self, users: &ResourceStore<User>) -> bool {
        let id = self.normalized_id();
        !id.is_empty() && !users.contains(&id)
    }

    /// New users are never admins.
    pub fn submit(&self) -> (String, UserConfiguration) {
        (
            self.normalized_id(),
            UserConfiguration {
                admin: false,
                can_customize_duration: self.can_customize_duration,
            },
        )
    }
}

/// Form state for the user update dialog, seeded from the selected user.
#[derive(Clone, Debug)]
pub struct UserUpdateForm {
    id: String,
    original: User,
    pub admin: bool,
    pub can_customize_duration: bool,
}

impl UserUpdateForm {
    pub fn new(id: &str, user: User) -> Self {
        Self {
            id: id.to_string(),
            original: user,
            admin: user.admin,
            can_customize_duration: user.can_customize_duration,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Update is enabled only when a flag differs from the stored user.
    pub fn is_dirty(&self) -> bool {
        self.admin != self.original.admin
            || self.can_customize_duration != self.original.can_customize_duration
    }

    pub fn submit(&self) -> (String, UserUpdateConfiguration) {
        (
            self.id.to_lowercase(),
            UserUpdateConfiguration {
                admin: self.admin,
                can_customize_duration: self.can_customize_duration,
            },
        )
    }
}

/// Which dialog is open on the users panel. At most one at a time.
#[derive(Clone, Debug, Default)]
pub enum DialogState {
    #[default]
    None,
    CreateUser { form: UserCreationForm },
    UpdateUser { form: UserUpdateForm },
}

impl DialogState {
    pub fn open_create() -> Self {
        DialogState::CreateUser {
            form: UserCreationForm::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::None)
    }

    pub fn creation_form_mut(&mut self) -> Option<&mut UserCreationForm> {
        match self {
            DialogState::CreateUser { form } => Some(form),
            _ => None,
        }
    }

    pub fn update_form_mut(&mut self) -> Option<&mut UserUpdateForm> {
        match self {
            DialogState::UpdateUser { form } => Some(form),
            _ => None,
        }
    }

    pub fn close(&mut self) {
        *self = DialogState::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn users_with_bob() -> ResourceStore<User> {
        let mut store = ResourceStore::new("Users");
        store.replace(Snapshot::from_iter([("bob", User::default())]));
        store
    }

    #[test]
    fn test_create_requires_new_non_empty_id() {
        let users = users_with_bob();
        let mut form = UserCreationForm::default();
        assert!(!form.can_submit(&users));

        form.id = "Bob".to_string();
        assert!(!form.can_submit(&users));

        form.id = "Alice".to_string();
        assert!(form.can_submit(&users));

        form.can_customize_duration = true;
        let (id, conf) = form.submit();
        assert_eq!(id, "alice");
        assert!(!conf.admin);
        assert!(conf.can_customize_duration);
    }

    #[test]
    fn test_update_enabled_only_when_changed() {
        let mut form = UserUpdateForm::new("bob", User::default());
        assert!(!form.is_dirty());

        form.admin = true;
        assert!(form.is_dirty());

        form.admin = false;
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_dialogs_are_exclusive() {
        let mut dialog = DialogState::open_create();
        assert!(dialog.creation_form_mut().is_some());
        assert!(dialog.update_form_mut().is_none());

        dialog = DialogState::UpdateUser {
            form: UserUpdateForm::new("bob", User::default()),
        };
        assert!(dialog.creation_form_mut().is_none());

        dialog.close();
        assert!(!dialog.is_open());
    }
}
