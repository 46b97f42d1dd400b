//! Metering endpoints: event ingestion (POST) and billing stats (GET).

use axum::{
    Json,
    extract::{Query, State},
};
use http::StatusCode;
use serde::Deserialize;

use crate::{
    AppState,
    error::ApiError,
    models::{BillingStats, UsageEvent},
};

/// Query parameters for the billing stats endpoint.
///
/// Epochs arrive as raw strings so a malformed value produces an
/// invalid-input error naming the parameter, rather than a generic
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub subject_id: Option<String>,
    pub since_epoch: Option<String>,
    pub until_epoch: Option<String>,
}

fn parse_epoch(name: &'static str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::InvalidInput(format!("{name} must be an integer epoch"))),
    }
}

/// Ingest one usage event.
#[tracing::instrument(name = "meter.ingest", skip(state, event))]
pub async fn add_usage(
    State(state): State<AppState>,
    Json(event): Json<UsageEvent>,
) -> Result<StatusCode, ApiError> {
    state.ingest.ingest(&event).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Answer an aggregate billing query.
#[tracing::instrument(name = "meter.stats", skip(state))]
pub async fn billing_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<BillingStats>, ApiError> {
    let since = parse_epoch("since_epoch", params.since_epoch.as_deref())?;
    let until = parse_epoch("until_epoch", params.until_epoch.as_deref())?;

    let total_quantity = state
        .stats
        .total_quantity(params.subject_id.as_deref(), since, until)
        .await?;

    Ok(Json(BillingStats { total_quantity }))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        build_app,
        query::QueryRunner,
        services::{IngestService, StatsService},
        testing::{MockEngine, MockStream},
    };

    fn app(stream: Arc<MockStream>, engine: MockEngine) -> axum::Router {
        let runner =
            QueryRunner::new(Arc::new(engine)).with_poll_interval(Duration::from_millis(1));
        let state = AppState {
            ingest: Arc::new(IngestService::new(stream, "usage-events")),
            stats: Arc::new(StatsService::new(
                runner,
                "billing",
                "usage_events",
                "s3://meterd-query-output",
                Duration::from_secs(5),
            )),
        };
        build_app(state)
    }

    fn sum_result(cell: &str) -> MockEngine {
        MockEngine::succeeding(vec![
            vec![Some("_col0".to_string())],
            vec![Some(cell.to_string())],
        ])
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_meter_returns_no_content() {
        let stream = Arc::new(MockStream::new());
        let app = app(stream.clone(), sum_result("0"));

        let response = app
            .oneshot(
                Request::post("/meter")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"subject_id":"acme","quantity":512,"event_time_epoch":1700000000}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(stream.append_count(), 1);
    }

    #[tokio::test]
    async fn test_post_meter_rejects_zero_quantity() {
        let stream = Arc::new(MockStream::new());
        let app = app(stream.clone(), sum_result("0"));

        let response = app
            .oneshot(
                Request::post("/meter")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"subject_id":"acme","quantity":0,"event_time_epoch":1700000000}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stream.append_count(), 0);
        let body = body_json(response).await;
        assert_eq!(body["code"], "invalid_input");
    }

    #[tokio::test]
    async fn test_get_meter_returns_total_quantity() {
        let app = app(Arc::new(MockStream::new()), sum_result("1024"));

        let response = app
            .oneshot(
                Request::get("/meter?subject_id=acme&since_epoch=100&until_epoch=200")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_quantity"], 1024);
    }

    #[tokio::test]
    async fn test_get_meter_without_filters_is_accepted() {
        let app = app(Arc::new(MockStream::new()), sum_result("7"));

        let response = app
            .oneshot(Request::get("/meter").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_quantity"], 7);
    }

    #[tokio::test]
    async fn test_get_meter_rejects_malformed_epoch() {
        let app = app(Arc::new(MockStream::new()), sum_result("0"));

        let response = app
            .oneshot(
                Request::get("/meter?since_epoch=yesterday")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "invalid_input");
    }

    #[tokio::test]
    async fn test_failed_query_maps_to_bad_gateway() {
        let app = app(
            Arc::new(MockStream::new()),
            MockEngine::stuck(crate::query::QueryState::Failed),
        );

        let response = app
            .oneshot(Request::get("/meter").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "query_failed");
        assert!(body["error"].as_str().unwrap().contains("FAILED"));
    }
}
