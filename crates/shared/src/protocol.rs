use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// A user record as stored by the remote users resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: u32,
}

/// Create body; the identifier is assigned by the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: u32,
}
