//! Security headers middleware.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Middleware that adds security headers to all responses.
///
/// - **Cache-Control: no-store**
///   Responses carry per-user session state and must not land in shared
///   caches.
///
/// - **Referrer-Policy: no-referrer**
///   Keeps board URLs out of Referer headers on outbound navigation.
///
/// - **X-Content-Type-Options: nosniff**
///   Prevents MIME type sniffing; browsers respect the declared
///   Content-Type.
///
/// - **X-Frame-Options: DENY**
///   Prevents clickjacking by disallowing the page from being embedded
///   in frames.
///
/// - **Strict-Transport-Security**
///   Forces HTTPS connections for 2 years, including subdomains.
///
/// - **Content-Security-Policy**
///   Same-origin only; no framing, base URLs and form targets restricted
///   to same origin.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("cache-control", HeaderValue::from_static("no-store"));
    headers.insert("referrer-policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
    );
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self'; \
             style-src 'self'; \
             object-src 'none'; \
             frame-ancestors 'none'; \
             base-uri 'self'; \
             form-action 'self'",
        ),
    );

    response
}
