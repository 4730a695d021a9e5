use postboard_types::models::User;

/// The signed-in user, if any. Handed to controllers explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn clear(&mut self) {
        self.user = None;
    }
}
