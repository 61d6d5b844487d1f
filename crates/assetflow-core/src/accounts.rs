//! Registration and self-service profile operations.

use serde::Serialize;

use crate::{
  Email, Error, Result,
  access::Caller,
  store::AssetStore,
  user::{NewUser, ProfileUpdate, User},
};

/// Outcome of [`register`]. Registration is idempotent: an existing account
/// is returned as-is with `user_exists` set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
  pub user_exists:      bool,
  pub user_information: User,
}

pub async fn register<S: AssetStore>(store: &S, input: NewUser) -> Result<Registration> {
  input.validate()?;
  let email = input.user_email.clone();

  if let Some(existing) = lookup(store, &email).await? {
    return Ok(Registration { user_exists: true, user_information: existing });
  }

  match store.insert_user(input).await.map_err(Error::store) {
    Ok(user) => {
      tracing::info!(email = %user.user_email, role = %user.user_role, "user registered");
      Ok(Registration { user_exists: false, user_information: user })
    }
    // Lost a race with a concurrent registration of the same email.
    Err(Error::Conflict(_)) => {
      let existing = lookup(store, &email)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {email}")))?;
      Ok(Registration { user_exists: true, user_information: existing })
    }
    Err(e) => Err(e),
  }
}

pub async fn lookup<S: AssetStore>(store: &S, email: &Email) -> Result<Option<User>> {
  store.get_user(email.clone()).await.map_err(Error::store)
}

pub async fn update_profile<S: AssetStore>(
  store: &S,
  caller: &Caller,
  update: ProfileUpdate,
) -> Result<User> {
  update.validate()?;
  if update.is_empty() {
    return Ok(caller.user.clone());
  }
  store
    .update_profile(caller.email().clone(), update)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("user {}", caller.email())))
}
