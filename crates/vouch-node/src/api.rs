//! Read-only HTTP API.

use crate::admin_socket::RankEntry;
use crate::commands::Dispatcher;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vouch_ledger::{LedgerStatus, UserId};

type AppState = Arc<Dispatcher>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser dashboards
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        .route("/api/v1/vouches/:user_id", get(get_vouches))
        .route("/api/v1/leaderboard/today", get(leaderboard_today))
        .route("/api/v1/status", get(status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// A user's vouch stats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserStats {
    user_id: String,
    total: u64,
    today: u64,
    streak: u32,
    trusted: bool,
}

async fn get_vouches(State(state): State<AppState>, Path(user_id): Path<u64>) -> Json<UserStats> {
    let user = UserId(user_id);
    let stats = state.query_vouch(user).await;
    Json(UserStats {
        // Snowflake ids overflow JavaScript numbers
        user_id: user.to_string(),
        total: stats.total,
        today: stats.today,
        streak: stats.streak,
        trusted: stats.is_trusted(),
    })
}

async fn leaderboard_today(State(state): State<AppState>) -> Json<Vec<RankEntry>> {
    let entries = state
        .leaderboard()
        .await
        .into_iter()
        .map(|(user, count)| RankEntry { user, count })
        .collect();
    Json(entries)
}

async fn status(State(state): State<AppState>) -> Json<LedgerStatus> {
    Json(state.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::{recording, Recorder};
    use crate::commands::Proof;
    use crate::service::LedgerService;
    use vouch_ledger::KeywordSet;

    #[tokio::test]
    async fn handlers_project_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(LedgerService::open(dir.path()).unwrap());
        let (collaborators, _clock) = recording("2024-01-01", Arc::new(Recorder::default()));
        let state = Arc::new(Dispatcher::new(service, collaborators, KeywordSet::default()));

        state
            .submit_vouch(
                UserId(1),
                UserId(2),
                Proof {
                    url: "https://x/p.png".into(),
                    content_type: "image/png".into(),
                },
            )
            .await
            .unwrap();

        let Json(stats) = get_vouches(State(state.clone()), Path(2)).await;
        assert_eq!(stats.user_id, "2");
        assert_eq!(stats.total, 1);
        assert_eq!(stats.today, 1);

        let Json(top) = leaderboard_today(State(state.clone())).await;
        assert_eq!(top, vec![RankEntry { user: UserId(2), count: 1 }]);

        let Json(summary) = status(State(state.clone())).await;
        assert_eq!(summary.total_all, 1);

        // Router builds with every route registered
        let _router = build_router(state);
    }
}
