use tracing::{error, info, warn};

use crate::auth::{password, services::is_valid_email};
use crate::db::{new_id, now_iso, Database, Entity, Guarded};
use crate::error::{AppError, AppResult};
use crate::folders::repo_types::{UserFolder, DEFAULT_FOLDER_NAME};
use crate::store::{Collection, Record};
use crate::users::repo_types::{DataCounts, User, UserPatch};

fn validate_credentials(username: &str, email: &str, password: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".into()));
    }
    if !email.is_empty() && !is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    Ok(())
}

fn already_registered() -> AppError {
    AppError::Conflict("Username or email already registered".into())
}

/// Validates, hashes and stores a new user together with its default folder.
///
/// The duplicate check and the insert share the users lock, so concurrent
/// registrations of one name cannot both succeed.
pub async fn create_user(db: &Database, mut user: User) -> AppResult<User> {
    user.username = user.username.trim().to_string();
    user.email = user.email.trim().to_lowercase();
    validate_credentials(&user.username, &user.email, &user.password)?;

    user.password = password::hash_password(&user.password)?;
    user.assign_id(new_id(User::ID_PREFIX));
    user.created_at = now_iso();

    let clash = |row: &Record| {
        User::clashes(row, Some(user.username.as_str()), Some(user.email.as_str()))
    };
    if db.insert_unless(&user, clash).await? == Guarded::Conflict {
        warn!(username = %user.username, "username or email already registered");
        return Err(already_registered());
    }

    let folder = UserFolder {
        id: new_id(UserFolder::ID_PREFIX),
        user_id: user.id.clone(),
        name: DEFAULT_FOLDER_NAME.to_string(),
        created_at: now_iso(),
    };
    db.insert(&folder).await?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
}

/// Applies a profile patch; a new password is hashed before it is stored.
pub async fn update_user(db: &Database, id: &str, mut patch: UserPatch) -> AppResult<Option<User>> {
    if let Some(email) = patch.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !email.is_empty() && !is_valid_email(email) {
            return Err(AppError::BadRequest("Invalid email".into()));
        }
    }
    if let Some(username) = patch.username.as_mut() {
        *username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::BadRequest("Username is required".into()));
        }
    }
    if let Some(plain) = patch.password.take() {
        if plain.is_empty() {
            return Err(AppError::BadRequest("Password is required".into()));
        }
        patch.password = Some(password::hash_password(&plain)?);
    }

    let username = patch.username.clone();
    let email = patch.email.clone();
    let clash = |row: &Record| User::clashes(row, username.as_deref(), email.as_deref());
    match db.patch_unless::<User, _, _>(id, &patch, clash).await? {
        Guarded::Written(user) => Ok(Some(user)),
        Guarded::Conflict => {
            warn!(user_id = %id, "profile update clashes with another user");
            Err(already_registered())
        }
        Guarded::Missing => Ok(None),
    }
}

/// Deletes every row the user owns, then the user.
///
/// All dependent collections are attempted. If any of them fails the user row
/// is left in place so the delete can be retried; rows already removed stay
/// removed.
pub async fn delete_user_cascade(db: &Database, id: &str) -> AppResult<bool> {
    if db.find::<User>(id).await?.is_none() {
        return Ok(false);
    }

    let mut failed = Vec::new();
    for collection in Collection::USER_OWNED {
        match db.delete_by_field(collection, "userId", id).await {
            Ok(removed) => info!(user_id = %id, %collection, removed, "cascade delete"),
            Err(e) => {
                error!(user_id = %id, %collection, error = %e, "cascade delete failed");
                failed.push(collection.name());
            }
        }
    }

    if !failed.is_empty() {
        return Err(AppError::Internal(format!(
            "user {} kept; cleanup failed for {}",
            id,
            failed.join(", ")
        )));
    }

    Ok(db.remove::<User>(id).await?)
}

pub async fn data_counts(db: &Database, user_id: &str) -> AppResult<DataCounts> {
    Ok(DataCounts {
        diet_plans: db
            .count_by_field(Collection::DailyDietPlans, "userId", user_id)
            .await?,
        exercise_plans: db
            .count_by_field(Collection::DailyExercisePlans, "userId", user_id)
            .await?,
        detox_plans: db
            .count_by_field(Collection::DailyDetoxPlans, "userId", user_id)
            .await?,
        weight_records: db
            .count_by_field(Collection::WeightRecords, "userId", user_id)
            .await?,
        measurements: db
            .count_by_field(Collection::Measurements, "userId", user_id)
            .await?,
        folders: db
            .count_by_field(Collection::UserFolders, "userId", user_id)
            .await?,
    })
}
