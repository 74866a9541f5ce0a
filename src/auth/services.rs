use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::AuthResponse;
use crate::auth::jwt::JwtKeys;
use crate::error::AppResult;
use crate::users::repo_types::{PublicUser, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Signs a fresh token pair for `user`.
pub(crate) fn issue_tokens(keys: &JwtKeys, user: User) -> AppResult<AuthResponse> {
    let access_token = keys.sign_access(&user.id)?;
    let refresh_token = keys.sign_refresh(&user.id)?;
    Ok(AuthResponse {
        success: true,
        user: PublicUser::from(user),
        access_token,
        refresh_token,
    })
}
