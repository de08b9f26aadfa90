use shared::{domain::UserId, protocol::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit,
}

/// Open create or edit workflow. `original` is a detached clone of the record being
/// edited; edits never reach the authoritative collection until the remote confirms them.
/// `generation` is unique per opened session, so two sessions with equal contents are
/// still told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EditSession {
    generation: u64,
    mode: SessionMode,
    original: Option<User>,
}

impl EditSession {
    pub(crate) fn create(generation: u64) -> Self {
        Self {
            generation,
            mode: SessionMode::Create,
            original: None,
        }
    }

    pub(crate) fn edit(generation: u64, original: User) -> Self {
        Self {
            generation,
            mode: SessionMode::Edit,
            original: Some(original),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn mode(&self) -> SessionMode {
        self.mode
    }

    pub(crate) fn original(&self) -> Option<&User> {
        self.original.as_ref()
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_open: true,
            mode: Some(self.mode),
            editing: self.original.clone(),
        }
    }
}

/// Read-only view of the session for a front end. A closed modal is the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_open: bool,
    pub mode: Option<SessionMode>,
    pub editing: Option<User>,
}

impl SessionSnapshot {
    pub fn editing_id(&self) -> Option<UserId> {
        self.editing.as_ref().map(|user| user.id)
    }
}
