//! Activity log (bitácora) server for the football league administration app.

use rocket::{Build, Rocket};

pub mod auth;
pub mod bitacora;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod settings;
pub mod state;

mod test_support;

pub use bitacora::{ActivityLog, FilterOptions, LogFilter};
pub use models::LogEntry;
pub use pagination::{Page, paginate};

use settings::ServerSettings;
use state::AppState;

/// Open the database and build the shared state.
pub fn bootstrap(settings: &ServerSettings) -> anyhow::Result<AppState> {
    let pool = db::initialize(settings)?;
    Ok(AppState::new(pool, &settings.client_label, settings.page_size))
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/api", routes::api_routes())
}
