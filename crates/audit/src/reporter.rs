//! Human-readable access reports and user cards.
//!
//! Takes a [`Registry`] and a [`Resource`] and produces the per-user verdict
//! list printed by the console front end.

use warden_core::{Registry, Resource, Role, User};

/// One user's verdict against the report's resource.
#[derive(Debug, Clone)]
pub struct AccessEntry {
    pub user_name: String,
    pub user_id: i64,
    pub role: &'static str,
    pub access_level: i64,
    pub granted: bool,
}

/// Verdicts for every registered user against one resource.
#[derive(Debug, Clone)]
pub struct AccessReport {
    pub resource: String,
    pub required_access_level: i64,
    pub entries: Vec<AccessEntry>,
    pub granted: usize,
    pub denied: usize,
}

impl AccessReport {
    /// Check every user in registry order.
    pub fn build(registry: &Registry, resource: &Resource) -> Self {
        let entries: Vec<AccessEntry> = registry
            .access_matrix(resource)
            .map(|(user, granted)| AccessEntry {
                user_name: user.name().to_string(),
                user_id: user.id(),
                role: user.role().tag(),
                access_level: user.access_level().get(),
                granted,
            })
            .collect();

        let granted = entries.iter().filter(|e| e.granted).count();
        let denied = entries.len() - granted;

        tracing::debug!(
            resource = %resource.name,
            required = resource.required_access_level,
            granted,
            denied,
            "access report built"
        );

        Self {
            resource: resource.name.clone(),
            required_access_level: resource.required_access_level,
            entries,
            granted,
            denied,
        }
    }

    /// Render as console lines, one per user.
    pub fn render(&self) -> String {
        let mut out = format!("Access check for resource '{}':\n", self.resource);
        for e in &self.entries {
            out.push_str(&format!(
                "{} - {}\n",
                e.user_name,
                if e.granted {
                    "access granted"
                } else {
                    "access denied"
                }
            ));
        }
        out
    }
}

/// Multi-line card for one user, followed by a blank line.
pub fn render_user_card(user: &User) -> String {
    match user.role() {
        Role::Student { group } => format!(
            "Student: {}\nID: {}\nGroup: {}\nAccess level: {}\n\n",
            user.name(),
            user.id(),
            group,
            user.access_level()
        ),
        Role::Teacher { department } => format!(
            "Teacher: {}\nID: {}\nDepartment: {}\nAccess level: {}\n\n",
            user.name(),
            user.id(),
            department,
            user.access_level()
        ),
        Role::Administrator => format!(
            "Administrator: {}\nID: {}\nAccess level: {}\n\n",
            user.name(),
            user.id(),
            user.access_level()
        ),
    }
}

/// Cards for all `users`, in the given order.
pub fn render_directory<'a>(users: impl IntoIterator<Item = &'a User>) -> String {
    users.into_iter().map(render_user_card).collect()
}
