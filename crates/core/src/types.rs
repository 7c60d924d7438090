//! Domain types for the Warden access-control registry.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Access level
// ---------------------------------------------------------------------------

/// Privilege tier: 1 = student, 2 = teacher, 3 = administrator.
///
/// Only constructible through [`AccessLevel::new`], so a value in hand is
/// always within `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AccessLevel(u8);

impl AccessLevel {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 3;

    pub fn new(level: i64) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(ValidationError::AccessLevelOutOfRange(level))
        }
    }

    #[inline]
    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for AccessLevel {
    type Error = ValidationError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<AccessLevel> for i64 {
    fn from(level: AccessLevel) -> Self {
        level.get()
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Subtype-specific part of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Student { group: String },
    Teacher { department: String },
    Administrator,
}

impl Role {
    /// Type tag used by both persisted formats.
    pub fn tag(&self) -> &'static str {
        match self {
            Role::Student { .. } => "student",
            Role::Teacher { .. } => "teacher",
            Role::Administrator => "admin",
        }
    }

    /// The group or department, if the role carries one.
    pub fn extra_field(&self) -> Option<&str> {
        match self {
            Role::Student { group } => Some(group),
            Role::Teacher { department } => Some(department),
            Role::Administrator => None,
        }
    }
}

/// A registered user. Fields are private so the invariants checked by the
/// constructors cannot be broken afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UserRecord", into = "UserRecord")]
pub struct User {
    name: String,
    id: i64,
    access_level: AccessLevel,
    role: Role,
}

impl User {
    /// Validates the common fields and the role's extra field.
    pub fn new(
        name: impl Into<String>,
        id: i64,
        access_level: i64,
        role: Role,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let access_level = AccessLevel::new(access_level)?;
        match &role {
            Role::Student { group } if group.is_empty() => return Err(ValidationError::EmptyGroup),
            Role::Teacher { department } if department.is_empty() => {
                return Err(ValidationError::EmptyDepartment)
            }
            _ => {}
        }
        Ok(Self {
            name,
            id,
            access_level,
            role,
        })
    }

    pub fn student(
        name: impl Into<String>,
        id: i64,
        access_level: i64,
        group: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            name,
            id,
            access_level,
            Role::Student {
                group: group.into(),
            },
        )
    }

    pub fn teacher(
        name: impl Into<String>,
        id: i64,
        access_level: i64,
        department: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            name,
            id,
            access_level,
            Role::Teacher {
                department: department.into(),
            },
        )
    }

    pub fn administrator(
        name: impl Into<String>,
        id: i64,
        access_level: i64,
    ) -> Result<Self, ValidationError> {
        Self::new(name, id, access_level, Role::Administrator)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

/// Flat, self-describing wire shape of a [`User`] for serde formats.
///
/// Deserializing goes through [`User::new`], so JSON input is validated
/// exactly like hand-built users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UserRecord {
    Student {
        name: String,
        id: i64,
        access_level: i64,
        group: String,
    },
    Teacher {
        name: String,
        id: i64,
        access_level: i64,
        department: String,
    },
    #[serde(rename = "admin")]
    Administrator {
        name: String,
        id: i64,
        access_level: i64,
    },
}

impl TryFrom<UserRecord> for User {
    type Error = ValidationError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        match record {
            UserRecord::Student {
                name,
                id,
                access_level,
                group,
            } => User::student(name, id, access_level, group),
            UserRecord::Teacher {
                name,
                id,
                access_level,
                department,
            } => User::teacher(name, id, access_level, department),
            UserRecord::Administrator {
                name,
                id,
                access_level,
            } => User::administrator(name, id, access_level),
        }
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        let User {
            name,
            id,
            access_level,
            role,
        } = user;
        let access_level = access_level.get();
        match role {
            Role::Student { group } => UserRecord::Student {
                name,
                id,
                access_level,
                group,
            },
            Role::Teacher { department } => UserRecord::Teacher {
                name,
                id,
                access_level,
                department,
            },
            Role::Administrator => UserRecord::Administrator {
                name,
                id,
                access_level,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A named entity guarded by a minimum access level.
///
/// `required_access_level` is not range-checked: a resource asking for
/// level 4 admits nobody, level 0 admits everyone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub required_access_level: i64,
}

impl Resource {
    pub fn new(name: impl Into<String>, required_access_level: i64) -> Self {
        Self {
            name: name.into(),
            required_access_level,
        }
    }

    /// `true` iff the user's level meets the requirement.
    #[inline]
    pub fn permits(&self, user: &User) -> bool {
        user.access_level().get() >= self.required_access_level
    }
}
