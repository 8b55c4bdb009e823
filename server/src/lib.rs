use anyhow::Result;
use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use classifier_core::{Classifier, ClassifierError, Label};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    #[serde(default)]
    pub terms: bool,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub label: Label,
    pub scores: Vec<LabelScore>,
    /// Vocabulary terms found in the text, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<(String, u32)>>,
    pub took_s: f64,
}

#[derive(Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier<Label>>,
    pub timeout: Duration,
}

/// Load the model once and build the router around it.
pub fn build_app<P: AsRef<Path>>(model: P, timeout: Duration) -> Result<Router> {
    let classifier: Classifier<Label> = Classifier::open(model)?;
    Ok(router(Arc::new(classifier), timeout))
}

pub fn router(classifier: Arc<Classifier<Label>>, timeout: Duration) -> Router {
    let app_state = AppState { classifier, timeout };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/labels", get(labels_handler))
        .route("/classify", post(classify_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn labels_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let labels: Vec<_> = state
        .classifier
        .labels()
        .iter()
        .map(|(id, name, _)| serde_json::json!({ "id": id, "label": name }))
        .collect();
    Json(serde_json::json!({ "labels": labels }))
}

pub async fn classify_handler(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let classifier = state.classifier.clone();
    let want_terms = req.terms;
    // Classification is CPU-bound; keep it off the async workers and bound its runtime.
    let task = tokio::task::spawn_blocking(move || {
        let analysis = classifier.analysis(&req.text)?;
        let label = *classifier.label_of(analysis.best)?;
        let scores = classifier
            .named_scores(&analysis.scores)
            .into_iter()
            .map(|(label, score)| LabelScore { label, score })
            .collect::<Vec<_>>();
        let terms = want_terms.then(|| analysis.terms.iter().map(|(t, c)| (t.to_string(), c)).collect::<Vec<_>>());
        Ok::<_, ClassifierError>((label, scores, terms))
    });

    let (label, scores, terms) = match tokio::time::timeout(state.timeout, task).await {
        Err(_) => {
            tracing::warn!(timeout_ms = state.timeout.as_millis() as u64, "classification timed out");
            return Err((StatusCode::REQUEST_TIMEOUT, "classification timed out".into()));
        }
        Ok(Err(e)) => return Err((StatusCode::INTERNAL_SERVER_ERROR, format!("classification task failed: {e}"))),
        Ok(Ok(Err(e))) => {
            tracing::error!(error = %e, "classification failed");
            return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
        }
        Ok(Ok(Ok(out))) => out,
    };

    tracing::info!(%label, "classified request");
    Ok(Json(ClassifyResponse { label, scores, terms, took_s: start.elapsed().as_secs_f64() }))
}
