use diesel::prelude::*;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::serde::json::Json;
use rocket::tokio::task::spawn_blocking;
use rocket::{State, post};
use serde::Deserialize;

use crate::auth::{AuthUser, SESSION_COOKIE};
use crate::bitacora::action;
use crate::error::LogError;
use crate::models::UserRow;
use crate::schema::users;
use crate::state::AppState;

/// Table name LOGIN entries are filed under.
pub const USERS_TABLE: &str = "users";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Handle login. A successful login opens a session entry in the bitacora.
#[post("/login", format = "json", data = "<form>")]
pub async fn login(
    form: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
    state: &State<AppState>,
) -> Status {
    let form = form.into_inner();
    if form.username.trim().is_empty() || form.password.trim().is_empty() {
        return Status::BadRequest;
    }

    let pool = state.db_pool.clone();
    let verified = spawn_blocking(move || -> Result<Option<UserRow>, LogError> {
        let mut conn = pool.get()?;
        let user = users::table
            .filter(users::username.eq(&form.username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user.filter(|u| bcrypt::verify(&form.password, &u.password_hash).unwrap_or(false)))
    })
    .await;

    let user = match verified {
        Ok(Ok(Some(user))) => user,
        Ok(Ok(None)) => return Status::Unauthorized,
        Ok(Err(e)) => {
            log::error!("Login lookup failed: {e}");
            return Status::InternalServerError;
        }
        Err(e) => {
            log::error!("Login task failed: {e}");
            return Status::InternalServerError;
        }
    };

    cookies.add_private(Cookie::new(SESSION_COOKIE, user.id.to_string()));

    let activity = state.activity.clone();
    let actor = user.username;
    let _ = spawn_blocking(move || {
        activity.record(
            USERS_TABLE,
            action::LOGIN,
            &format!("User {actor} logged in"),
            Some(&actor),
        );
    })
    .await;

    Status::Ok
}

/// Handle logout. Closes the user's open session entry.
#[post("/logout")]
pub async fn logout(user: AuthUser, cookies: &CookieJar<'_>, state: &State<AppState>) -> Status {
    let activity = state.activity.clone();
    let _ = spawn_blocking(move || activity.close_session(&user.username)).await;

    cookies.remove_private(SESSION_COOKIE);
    Status::Ok
}
