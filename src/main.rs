use anyhow::{Result, anyhow};

use liga_bitacora::settings::ServerSettings;
use liga_bitacora::{bootstrap, build_rocket, db};

#[rocket::main]
async fn main() -> Result<()> {
    let settings = ServerSettings::from_env();
    let _logger = db::logger::init_logger(&settings)?;

    log::info!("Opening database at {}", settings.database_url);
    let state = bootstrap(&settings)?;

    build_rocket(state)
        .launch()
        .await
        .map_err(|e| anyhow!("server stopped with an error: {e}"))?;

    Ok(())
}
