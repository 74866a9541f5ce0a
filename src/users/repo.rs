use crate::db::Database;
use crate::store::{Record, StoreError};
use crate::users::repo_types::User;

impl User {
    /// Finds a user by username or, failing that, by email. Emails are
    /// stored lowercased, so the login is lowercased before that comparison.
    pub async fn find_by_login(db: &Database, login: &str) -> Result<Option<User>, StoreError> {
        let email = login.trim().to_lowercase();
        let users: Vec<User> = db.list().await?;
        Ok(users
            .into_iter()
            .find(|u| u.username == login || (!u.email.is_empty() && u.email == email)))
    }

    /// Whether a stored user row already holds `username` or `email`.
    /// Empty values never clash.
    pub fn clashes(row: &Record, username: Option<&str>, email: Option<&str>) -> bool {
        let field = |name: &str| row.get(name).and_then(|v| v.as_str()).unwrap_or_default();
        let same_name = username.is_some_and(|n| !n.is_empty() && field("username") == n);
        let same_email = email.is_some_and(|e| !e.is_empty() && field("email") == e);
        same_name || same_email
    }
}
