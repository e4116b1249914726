use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::{future::Future, sync::Arc, time::Instant};
use tracing::{error, info, instrument, warn, Instrument};

use super::{get_current_trace_id, Metrics};
use crate::models::User;

/// Outcome labels for a finished future
fn outcome<T, E>(result: &Result<T, E>) -> bool {
    result.is_ok()
}

/// Request span, in-flight gauge and request metrics for every route
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let client_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
        })
        .unwrap_or("unknown")
        .trim()
        .to_string();

    // Unmatched paths share one label so scanners cannot blow up cardinality
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span_name = format!("{} {}", method, endpoint);
    let span = tracing::info_span!(
        target: "cafeteria_rs::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        http.user_agent = %user_agent,
        client.address = %client_ip,
        http.response.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async {
        metrics.increment_in_flight(&method, &endpoint);
        let trace_id = get_current_trace_id();

        info!(trace_id = ?trace_id, method = %method, path = %endpoint, "Processing request");

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        let current_span = tracing::Span::current();
        current_span.record("http.response.status_code", status_code);
        current_span.record("http.response_time_ms", duration_ms);

        metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());
        metrics.decrement_in_flight(&method, &endpoint);

        if status_code >= 500 {
            error!(
                trace_id = ?trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request failed"
            );
        } else if status_code >= 400 {
            warn!(
                trace_id = ?trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request rejected"
            );
        } else {
            info!(
                trace_id = ?trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Wraps database calls with timing, metrics and error logging
pub struct DatabaseTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl DatabaseTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, table = %table))]
    pub async fn trace_operation<F, T, E>(
        &self,
        operation: &str,
        table: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;
        let duration = start_time.elapsed();

        self.metrics
            .record_database_operation(operation, table, outcome(&result), duration.as_secs_f64());

        match &result {
            Ok(_) => tracing::debug!(
                duration_ms = duration.as_millis(),
                "Database operation completed"
            ),
            Err(error) => error!(
                error = %error,
                duration_ms = duration.as_millis(),
                "Database operation failed"
            ),
        }

        result
    }
}

/// Wraps service calls with business metrics
pub struct BusinessTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl BusinessTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    /// Trace a cart mutation for a logged-in user
    #[instrument(skip_all, fields(operation = %operation, user_id = user_id))]
    pub async fn trace_cart_operation<F, T, E>(
        &self,
        operation: &str,
        user_id: i64,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;
        self.metrics.record_cart_operation(operation, outcome(&result));

        match &result {
            Ok(_) => info!(
                duration_ms = start_time.elapsed().as_millis(),
                "Cart operation completed"
            ),
            Err(error) => warn!(
                error = %error,
                duration_ms = start_time.elapsed().as_millis(),
                "Cart operation failed"
            ),
        }

        result
    }

    /// Trace a menu lookup for a rotation week
    #[instrument(skip_all, fields(week = week))]
    pub async fn trace_menu_request<F, T, E>(&self, week: u32, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let result = future.await;
        self.metrics.record_menu_request(week, outcome(&result));

        if let Err(error) = &result {
            error!(error = %error, "Menu lookup failed");
        }

        result
    }

    /// Trace a login or registration attempt
    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn trace_auth_operation<F, T, E>(&self, operation: &str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: AuthAttempt,
        E: std::fmt::Display,
    {
        let result = future.await;
        let accepted = matches!(&result, Ok(value) if value.accepted());
        self.metrics.record_auth_operation(operation, accepted);

        match &result {
            Ok(_) if accepted => info!("Auth operation succeeded"),
            Ok(_) => warn!("Auth operation rejected"),
            Err(error) => warn!(error = %error, "Auth operation failed"),
        }

        result
    }
}

/// Whether an auth call produced an identity
pub trait AuthAttempt {
    fn accepted(&self) -> bool;
}

impl AuthAttempt for User {
    fn accepted(&self) -> bool {
        true
    }
}

impl<T: AuthAttempt> AuthAttempt for Option<T> {
    fn accepted(&self) -> bool {
        self.as_ref().is_some_and(AuthAttempt::accepted)
    }
}
