//! Local stand-in for the remote identity API.
//!
//! Every OTP it issues is `123456` and is echoed back as `otp_code`. Two
//! accounts are seeded: `RA176900435` (active) and `RA100000001` (must reset
//! its password), both with password `Password@123`.

pub(crate) mod handlers;
mod state;

pub use state::{SandboxState, SharedState, SANDBOX_OTP};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Router,
};
use handlers::{health, kyc, login, recovery, registration};
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

/// Build the sandbox router over `state`.
#[must_use]
pub fn router(state: SharedState) -> Router {
    let secure = Router::new()
        .route("/secure/create", post(registration::create))
        .route("/secure/verify-otp", post(registration::verify_otp))
        .route(
            "/secure/generate-email-otp",
            post(registration::generate_email_otp),
        )
        .route("/secure/register", post(registration::register))
        .route("/secure/aadhar-otp-generate", post(kyc::aadhaar_otp_generate))
        .route("/secure/aadhar-otp-verify", post(kyc::aadhaar_otp_verify))
        .route("/secure/pan-verify", post(kyc::pan_verify))
        .route("/secure/reset-password", post(recovery::reset_password))
        .route(
            "/secure/verify-otp-password",
            post(recovery::verify_otp_password),
        )
        .route("/secure/forgot-password", post(recovery::forgot_password))
        .route("/secure/username-forgot", post(recovery::username_forgot))
        .route_layer(middleware::from_fn(handlers::require_known_token));

    Router::new()
        .route("/health", get(health::health))
        .route("/secure/login", post(login::login))
        .merge(secure)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Serve the sandbox on an already bound listener until `shutdown` resolves.
///
/// # Errors
/// Return error if the server fails
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(SandboxState::shared());

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Sandbox server failed")
}

/// Start the sandbox on `port` and run until ctrl-c.
///
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    serve(listener, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", err);
        }
        info!("Gracefully shutdown");
    })
    .await
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let response = app.oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    fn post_json(path: &str, body: &Value) -> anyhow::Result<Request<Body>> {
        Ok(Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?)
    }

    #[tokio::test]
    async fn health_reports_sandbox_with_app_header() -> anyhow::Result<()> {
        let app = router(SandboxState::shared());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let x_app = response
            .headers()
            .get("X-App")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(x_app.starts_with(env!("CARGO_PKG_NAME")));
        assert!(response.headers().contains_key("x-request-id"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_bearer_token_is_unauthorized() -> anyhow::Result<()> {
        let app = router(SandboxState::shared());
        let request = Request::post("/secure/create")
            .header("content-type", "application/json")
            .header("authorization", "Bearer never-issued")
            .body(Body::from(r#"{"mobile":"9876543210"}"#))?;

        let (status, body) = call(app, request).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");
        Ok(())
    }

    #[tokio::test]
    async fn mobile_otp_yields_urn() -> anyhow::Result<()> {
        let app = router(SandboxState::shared());

        let (status, body) = call(
            app.clone(),
            post_json("/secure/create", &json!({"mobile": "9876543210"}))?,
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["otp_code"], SANDBOX_OTP);
        let ref_id = body["ref_id"].as_str().unwrap_or_default().to_string();

        let (_, wrong) = call(
            app.clone(),
            post_json(
                "/secure/verify-otp",
                &json!({"ref_id": ref_id, "otp": "000000"}),
            )?,
        )
        .await?;
        assert_eq!(wrong["status"], 400);
        assert!(wrong.get("urn").is_none());

        let (_, verified) = call(
            app,
            post_json(
                "/secure/verify-otp",
                &json!({"ref_id": ref_id, "otp": SANDBOX_OTP}),
            )?,
        )
        .await?;
        assert_eq!(verified["status"], 200);
        assert!(verified["urn"].as_str().is_some_and(|u| u.starts_with("URN")));
        Ok(())
    }

    #[tokio::test]
    async fn register_requires_completed_kyc() -> anyhow::Result<()> {
        let state = SandboxState::shared();
        let urn = state.lock().await.open_registration("9876543210".to_string());
        let app = router(state);

        let (status, body) = call(
            app,
            post_json(
                "/secure/register",
                &json!({"urn": urn, "accepted_terms": true}),
            )?,
        )
        .await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "KYC incomplete");
        Ok(())
    }

    #[tokio::test]
    async fn seeded_reset_account_gets_1001() -> anyhow::Result<()> {
        let app = router(SandboxState::shared());
        let (status, body) = call(
            app,
            post_json(
                "/secure/login",
                &json!({"username": "RA100000001", "password": "Password@123"}),
            )?,
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 1001);
        assert!(body.get("access_token").is_none());
        Ok(())
    }
}
