use diesel::prelude::*;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::tokio::task::spawn_blocking;

use crate::error::AuthError;
use crate::models::UserRow;
use crate::schema::users;
use crate::state::AppState;

/// Private cookie holding the logged-in user's id.
pub const SESSION_COOKIE: &str = "user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn from_db(role: &str) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

/// Authenticated user structure
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }
}

impl From<UserRow> for AuthUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            role: UserRole::from_db(&row.role),
            username: row.username,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(user_id) = req
            .cookies()
            .get_private(SESSION_COOKIE)
            .and_then(|c| c.value().parse::<i32>().ok())
        else {
            return Outcome::Error((Status::Unauthorized, AuthError::MissingSession));
        };

        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((
                Status::InternalServerError,
                AuthError::Lookup("application state not managed".into()),
            ));
        };

        let pool = state.db_pool.clone();
        let lookup = spawn_blocking(move || -> Result<Option<UserRow>, String> {
            let mut conn = pool.get().map_err(|e| e.to_string())?;
            users::table
                .find(user_id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .optional()
                .map_err(|e| e.to_string())
        })
        .await;

        match lookup {
            Ok(Ok(Some(row))) => Outcome::Success(row.into()),
            Ok(Ok(None)) => Outcome::Error((Status::Unauthorized, AuthError::UnknownUser)),
            Ok(Err(e)) => {
                log::error!("Session lookup for user {user_id} failed: {e}");
                Outcome::Error((Status::InternalServerError, AuthError::Lookup(e)))
            }
            Err(e) => Outcome::Error((Status::InternalServerError, AuthError::Lookup(e.to_string()))),
        }
    }
}
