//! Axum route handlers for the Layout API.

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::layout::geometry::GRID_COLUMNS;
use crate::layout::grid::GridPosition;
use crate::layout::{optimize_layout, GridGeometry, LayoutStats};
use crate::models::article::Article;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    /// Render order. Every card carries `cols`, `rows`, and `awards`.
    pub articles: Vec<Article>,
    /// Committed grid positions, parallel to `articles`. Empty when bypassed.
    pub positions: Vec<GridPosition>,
    pub stats: Option<LayoutStats>,
    /// True when the batch arrived pre-sized and was returned unchanged.
    pub bypassed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/layout/geometry
///
/// Returns the geometry the optimizer sizes cards with, so the renderer can check
/// its stylesheet against it.
pub async fn handle_get_geometry(State(state): State<AppState>) -> Json<GridGeometry> {
    Json(state.config.geometry.clone())
}

/// POST /api/v1/layout
///
/// Sizes, ranks, and packs a batch of articles. A batch where every article already
/// carries `cols` and `rows` was laid out upstream and is returned as-is.
pub async fn handle_layout(
    State(state): State<AppState>,
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> Result<Json<LayoutResponse>, AppError> {
    let Json(request) = payload?;
    validate_request(&request, state.config.max_articles)?;

    let articles = request.articles;
    if !articles.is_empty() && articles.iter().all(Article::is_prebaked) {
        debug!(count = articles.len(), "Layout: pre-sized batch, skipping optimizer");
        return Ok(Json(LayoutResponse {
            articles,
            positions: Vec::new(),
            stats: None,
            bypassed: true,
        }));
    }

    // CPU-bound packing — spawn_blocking to avoid blocking the async executor.
    let geometry = state.config.geometry.clone();
    let outcome = tokio::task::spawn_blocking(move || optimize_layout(&articles, &geometry))
        .await
        .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in layout: {e}")))?;

    Ok(Json(LayoutResponse {
        articles: outcome.articles,
        positions: outcome.positions,
        stats: Some(outcome.stats),
        bypassed: false,
    }))
}

fn validate_request(request: &LayoutRequest, max_articles: usize) -> Result<(), AppError> {
    if request.articles.len() > max_articles {
        return Err(AppError::Validation(format!(
            "Too many articles: {} (max {max_articles})",
            request.articles.len()
        )));
    }
    if let Some(pos) = request.articles.iter().position(|a| a.id.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "articles[{pos}].id cannot be empty"
        )));
    }
    for (pos, article) in request.articles.iter().enumerate() {
        if let Some(cols) = article.cols {
            if cols == 0 || cols as usize > GRID_COLUMNS {
                return Err(AppError::Validation(format!(
                    "articles[{pos}].cols must be between 1 and {GRID_COLUMNS}, got {cols}"
                )));
            }
        }
        if article.rows == Some(0) {
            return Err(AppError::Validation(format!(
                "articles[{pos}].rows must be at least 1"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ids: &[&str]) -> LayoutRequest {
        LayoutRequest {
            articles: ids.iter().map(|id| Article::new(*id, "")).collect(),
        }
    }

    #[test]
    fn test_validate_accepts_normal_batch() {
        assert!(validate_request(&request(&["a", "b"]), 10).is_ok());
        assert!(validate_request(&request(&[]), 10).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let err = validate_request(&request(&["a", "  "]), 10).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("articles[1]")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_oversized_batch() {
        let err = validate_request(&request(&["a", "b", "c"]), 2).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_out_of_grid_dimensions() {
        let mut wide = request(&["a"]);
        wide.articles[0].cols = Some(12);
        wide.articles[0].rows = Some(5);
        let err = validate_request(&wide, 10).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("articles[0].cols")),
            other => panic!("expected Validation, got {other:?}"),
        }

        let mut flat = request(&["a", "b"]);
        flat.articles[1].cols = Some(4);
        flat.articles[1].rows = Some(0);
        assert!(matches!(
            validate_request(&flat, 10),
            Err(AppError::Validation(_))
        ));

        let mut full = request(&["a"]);
        full.articles[0].cols = Some(10);
        full.articles[0].rows = Some(80);
        assert!(validate_request(&full, 10).is_ok());
    }

    #[test]
    fn test_validate_allows_duplicate_ids() {
        assert!(validate_request(&request(&["dup", "dup"]), 10).is_ok());
    }
}
