//! In-memory registry of users and resources.

use crate::codec;
use crate::error::{WardenError, WardenResult};
use crate::types::{Resource, User};
use smallvec::SmallVec;

/// Matches returned by [`Registry::find_users`].
///
/// Queries almost always hit zero or one user, so four inline slots keep
/// the common case off the heap.
pub type UserMatches<'a> = SmallVec<[&'a User; 4]>;

/// Ordered users plus ordered resources.
///
/// No cross-checks between the two lists: a resource may require a level no
/// user holds, and user ids are not required to be unique.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    users: Vec<User>,
    resources: Vec<Resource>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// First resource with this exact name.
    pub fn resource(&self, name: &str) -> WardenResult<&Resource> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| WardenError::UnknownResource(name.to_string()))
    }

    /// Every user whose name equals `query` or whose id prints as `query`.
    ///
    /// Both conditions are checked for each user, so a name that happens to
    /// look like another user's id yields both.
    pub fn find_users(&self, query: &str) -> UserMatches<'_> {
        self.users
            .iter()
            .filter(|u| u.name() == query || u.id().to_string() == query)
            .collect()
    }

    #[inline]
    pub fn check_access(&self, user: &User, resource: &Resource) -> bool {
        resource.permits(user)
    }

    /// Every user paired with its verdict for `resource`, in registry order.
    pub fn access_matrix<'a>(
        &'a self,
        resource: &'a Resource,
    ) -> impl Iterator<Item = (&'a User, bool)> + 'a {
        self.users
            .iter()
            .map(move |u| (u, self.check_access(u, resource)))
    }

    /// Stable ascending sort; users with equal levels keep their order.
    pub fn sort_by_access_level(&mut self) {
        self.users.sort_by_key(User::access_level);
    }

    pub fn clear_users(&mut self) {
        self.users.clear();
    }

    /// Swap in a freshly loaded user list. Resources are untouched.
    pub fn replace_users(&mut self, users: Vec<User>) {
        tracing::debug!(
            previous = self.users.len(),
            loaded = users.len(),
            "replacing users"
        );
        self.users = users;
    }

    /// Users in the legacy line format.
    pub fn serialize(&self) -> String {
        codec::encode(&self.users)
    }

    /// Replace the users with those decoded from `text`.
    ///
    /// All-or-nothing: on any malformed line the registry is unchanged and
    /// the error lists every bad line. Returns the number of users loaded.
    pub fn deserialize(&mut self, text: &str) -> WardenResult<usize> {
        let users = codec::decode(text)?;
        let n = users.len();
        self.replace_users(users);
        Ok(n)
    }
}
