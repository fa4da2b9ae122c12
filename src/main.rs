//! The answer-king item service.

use answer_king::{
    feature::item::item_repository::{MemoryItemRepository, PgItemRepository},
    infra::{
        config::{self, Backend},
        database, logging,
        state::AppState,
    },
    server,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let config = config::load_config()?;
    let _guard = logging::init_logging(&config.logging)?;

    let state = match config.database.backend {
        Backend::Postgres => {
            let db = database::init_db(&config.database);
            if config.database.run_migrations {
                database::migrate(&db).await?;
            }
            AppState::new(PgItemRepository::new(db))
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory item storage, items are lost on shutdown");
            AppState::new(MemoryItemRepository::new())
        }
    };

    let listener = TcpListener::bind(format!(
        "{}:{}",
        config.server.http_address, config.server.http_port
    ))
    .await?;
    server::run_app(listener, state, config.server).await?;

    Ok(())
}
