//! Browser security headers for every response.
//!
//! The service is a JSON API, so the baseline Content-Security-Policy is
//! `default-src 'none'` — an API body should never execute anything. The one
//! exception is the bundled Swagger UI, which ships inline scripts and
//! styles and therefore gets a relaxed policy scoped to its paths.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Locked-down policy for API responses: nothing loads, nothing frames us.
const CSP_API: &str = "default-src 'none'; frame-ancestors 'none'";

/// Swagger UI needs inline script/style and data: URIs for its icons.
const CSP_DOCS: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; img-src 'self' data:";

fn csp_for_path(path: &str) -> &'static str {
    if path.starts_with("/swagger-ui") || path.starts_with("/api-docs") {
        CSP_DOCS
    } else {
        CSP_API
    }
}

pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let csp = csp_for_path(request.uri().path());
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(csp));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static(
            "geolocation=(), camera=(), microphone=(), payment=(), usb=()",
        ),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/v2/books", get(|| async { "[]" }))
            .route("/swagger-ui/index.html", get(|| async { "<html></html>" }))
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn send(uri: &str) -> Response {
        router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn api_responses_carry_locked_down_headers() {
        let response = send("/v2/books").await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(
            headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(
            headers.get(header::STRICT_TRANSPORT_SECURITY).unwrap(),
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(
            headers.get(header::CONTENT_SECURITY_POLICY).unwrap(),
            CSP_API
        );
        assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "no-referrer");
        assert_eq!(
            headers.get("permissions-policy").unwrap(),
            "geolocation=(), camera=(), microphone=(), payment=(), usb=()"
        );
        // Legacy XSS-auditor header is deliberately absent.
        assert!(headers.get("x-xss-protection").is_none());
    }

    #[tokio::test]
    async fn swagger_ui_gets_relaxed_csp() {
        let response = send("/swagger-ui/index.html").await;
        let csp = response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains("'unsafe-inline'"));
        assert!(csp.contains("img-src 'self' data:"));
    }

    #[tokio::test]
    async fn headers_present_on_error_responses() {
        let response = send("/boom").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response
            .headers()
            .get(header::X_CONTENT_TYPE_OPTIONS)
            .is_some());
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_SECURITY_POLICY)
                .unwrap(),
            CSP_API
        );
    }
}
