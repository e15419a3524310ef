use std::time::Duration;

use anyhow::Context;
use storage::{Database, models::PayoutSplits, repository::episode::EpisodeRepository};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod features;
mod middleware;
mod routes;
mod state;

use config::Config;
use features::{bets, deltas, episodes, rankings, users};
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        episodes::handlers::list_episodes,
        episodes::handlers::create_episode,
        episodes::handlers::get_current_episode,
        episodes::handlers::set_current_episode,
        deltas::handlers::calculate_deltas,
        deltas::handlers::clear_deltas,
        bets::handlers::list_bets,
        bets::handlers::create_bet,
        bets::handlers::accept_bet,
        bets::handlers::resolve_bet,
        bets::handlers::delete_bet,
        users::handlers::get_balance_history,
        users::handlers::list_users_with_rankings,
        rankings::handlers::get_rankings,
        rankings::handlers::submit_rankings,
        rankings::handlers::backfill_rankings,
    ),
    components(
        schemas(
            storage::dto::delta::CalculateDeltasRequest,
            storage::dto::delta::CalculateDeltasResponse,
            storage::dto::delta::UsersWithoutRankingsResponse,
            storage::dto::delta::UserSummary,
            storage::dto::delta::MessageResponse,
            storage::dto::delta::BalanceEntry,
            storage::dto::delta::BalanceHistoryResponse,
            storage::dto::episode::CreateEpisodeRequest,
            storage::dto::episode::SetCurrentEpisodeRequest,
            storage::dto::episode::EpisodeResponse,
            storage::dto::episode::CurrentEpisodeResponse,
            storage::dto::episode::EpisodeListResponse,
            storage::dto::episode::CreatedEpisodeResponse,
            storage::dto::bet::CreateBetRequest,
            storage::dto::bet::AcceptBetRequest,
            storage::dto::bet::ResolveBetRequest,
            storage::dto::bet::BetResponse,
            storage::dto::bet::BetListResponse,
            storage::dto::ranking::RankingEntry,
            storage::dto::ranking::SubmitRankingsRequest,
            storage::dto::ranking::RankingsResponse,
            storage::dto::ranking::UserWithRankings,
            storage::dto::ranking::UsersWithRankingsResponse,
            storage::dto::ranking::BackfillRankingsResponse,
            storage::models::Episode,
            storage::models::Ranking,
            storage::models::Bet,
            storage::models::BetWithAccepters,
            storage::models::UserDelta,
        )
    ),
    tags(
        (name = "episodes", description = "Episode lifecycle and the current-episode flag"),
        (name = "deltas", description = "Per-episode point delta calculation"),
        (name = "bets", description = "Proposing, accepting and resolving bets"),
        (name = "users", description = "User balance history and rankings overview"),
        (name = "rankings", description = "Ranking submission and maintenance"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("Session token")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Star Baker League API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let splits = PayoutSplits::from_path(&config.payout_splits_path).with_context(|| {
        format!(
            "Failed to load payout splits from {}",
            config.payout_splits_path
        )
    })?;
    tracing::info!("Loaded payout splits for {} episodes", splits.len());

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let episodes = EpisodeRepository::new(db.pool())
        .list()
        .await
        .context("Failed to list episodes")?;
    splits
        .ensure_covers(episodes.iter().map(|episode| episode.number))
        .context("Payout split table does not cover every episode")?;

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; every request will be rejected");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let app = routes::router(AppState::new(db, splits), api_keys)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
