use chrono::NaiveDate;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::tokio::task::spawn_blocking;
use rocket::{FromForm, State, get, post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::{AuthUser, UserRole};
use crate::bitacora::{FilterOptions, LogFilter};
use crate::models::LogEntry;
use crate::pagination::paginate;
use crate::state::AppState;

type ApiError = Custom<Json<Value>>;

fn api_error(status: Status, message: impl Into<String>) -> ApiError {
    Custom(status, Json(json!({ "error": message.into() })))
}

fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.has_role(UserRole::Admin) {
        Ok(())
    } else {
        Err(api_error(Status::Forbidden, "the activity log is restricted to administrators"))
    }
}

/// Query string for the log listing. Blank values mean "no filter".
#[derive(Debug, Default, FromForm)]
pub struct LogQuery {
    pub actor: Option<String>,
    pub table: Option<String>,
    pub action: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    non_blank(value)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                api_error(Status::BadRequest, format!("`{field}` must be a YYYY-MM-DD date, got {raw:?}"))
            })
        })
        .transpose()
}

impl LogQuery {
    pub fn into_filter(self) -> Result<(LogFilter, Option<usize>, Option<usize>), ApiError> {
        let filter = LogFilter {
            actor: non_blank(self.actor),
            affected_table: non_blank(self.table),
            action_kind: non_blank(self.action),
            from: parse_date("from", self.from)?,
            to: parse_date("to", self.to)?,
        };
        Ok((filter, self.page, self.per_page))
    }
}

#[derive(Debug, Serialize)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_entries: usize,
}

/// Filtered, paginated activity log. Admin only.
#[get("/bitacora?<query..>")]
pub async fn list_entries(
    user: AuthUser,
    state: &State<AppState>,
    query: LogQuery,
) -> Result<Json<LogPage>, ApiError> {
    require_admin(&user)?;
    let (filter, page, per_page) = query.into_filter()?;
    let per_page = per_page.unwrap_or(state.page_size).max(1);

    let activity = state.activity.clone();
    let entries = spawn_blocking(move || activity.list(&filter))
        .await
        .map_err(|e| api_error(Status::InternalServerError, e.to_string()))?
        .map_err(|e| {
            log::error!("Failed to load the bitacora: {e}");
            api_error(Status::InternalServerError, format!("failed to load the activity log: {e}"))
        })?;

    let slice = paginate(&entries, per_page, page.unwrap_or(1));
    Ok(Json(LogPage {
        entries: slice.items.to_vec(),
        page: slice.page,
        per_page,
        total_pages: slice.total_pages,
        total_entries: slice.total_items,
    }))
}

/// Values available for the listing filters. Admin only.
#[get("/bitacora/filters")]
pub async fn filter_options(
    user: AuthUser,
    state: &State<AppState>,
) -> Result<Json<FilterOptions>, ApiError> {
    require_admin(&user)?;

    let activity = state.activity.clone();
    spawn_blocking(move || activity.filter_options())
        .await
        .map_err(|e| api_error(Status::InternalServerError, e.to_string()))?
        .map(Json)
        .map_err(|e| {
            log::error!("Failed to load bitacora filters: {e}");
            api_error(Status::InternalServerError, format!("failed to load filter options: {e}"))
        })
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub table: String,
    pub action: String,
    #[serde(default)]
    pub description: String,
    pub client_label: Option<String>,
}

/// Record an action performed by the session user. Feature modules call
/// this after their own commit succeeded; the answer is always 202 because
/// a lost log write must not fail the action.
#[post("/bitacora", format = "json", data = "<entry>")]
pub async fn record_entry(
    user: AuthUser,
    state: &State<AppState>,
    entry: Json<RecordRequest>,
) -> Status {
    let entry = entry.into_inner();
    let activity = state.activity.clone();

    let _ = spawn_blocking(move || {
        let label = entry
            .client_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(activity.client_label())
            .to_string();
        activity.record_with_label(
            &entry.table,
            &entry.action,
            &entry.description,
            Some(&user.username),
            &label,
        );
    })
    .await;

    Status::Accepted
}
