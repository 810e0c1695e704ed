//! One-shot redirect listener for the authorization code.
//!
//! Binds `0.0.0.0:<port>`, accepts exactly one inbound request (the
//! provider's redirect), lets a [`CallbackResponder`] answer it, and closes
//! the socket. The bound listener is owned by [`BoundCallbackListener`] and
//! consumed by [`BoundCallbackListener::receive`], so it is released on every
//! exit path, including accept/read failures and redirects without a code.
//!
//! The code is pulled out of the raw request target by pattern matching on
//! `code=`; the port and redirect URI must match what was registered with the
//! provider.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

use super::state::StateToken;
use crate::error::{AuthError, Result};

/// Upper bound on the request head we are willing to buffer.
const MAX_REQUEST_HEAD: usize = 16 * 1024;

// =============================================================================
// Request / response model
// =============================================================================

/// The inbound redirect request, as seen by the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRequest {
    pub method: String,
    /// Raw request target, e.g. `/callback?state=...&code=...`.
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl CallbackRequest {
    /// Parse an HTTP/1.x request head.
    pub fn parse(head: &str) -> Option<Self> {
        let mut lines = head.lines();
        let mut request_line = lines.next()?.split_whitespace();
        let method = request_line.next()?.to_string();
        let target = request_line.next()?.to_string();

        let headers = lines
            .take_while(|line| !line.is_empty())
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        Some(Self {
            method,
            target,
            headers,
        })
    }

    /// The authorization code carried by the redirect, if any.
    pub fn code(&self) -> Option<String> {
        extract_query_param(&self.target, "code")
    }

    pub fn state(&self) -> Option<String> {
        extract_query_param(&self.target, "state")
    }

    /// The provider's `error` parameter (e.g. `access_denied`).
    pub fn error(&self) -> Option<String> {
        extract_query_param(&self.target, "error")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Extract `name=value` from the query part of a raw request target.
///
/// Matches the parameter only at a `?` or `&` boundary, stops at the next
/// `&` or `#`, and percent-decodes the value. Empty values count as absent.
pub fn extract_query_param(target: &str, name: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or_default();
    let prefix = format!("{name}=");

    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(|value| match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        })
}

/// Response written back to the user's browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl CallbackResponse {
    /// A bare status with an empty body.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }

    pub fn html(status: StatusCode, body: String) -> Self {
        Self {
            status,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body,
        }
    }

    fn to_http(&self) -> String {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        );
        if let Some(ref content_type) = self.content_type {
            out.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        out.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));
        out.push_str(&self.body);
        out
    }
}

// =============================================================================
// Responders
// =============================================================================

/// Writes the answer to the redirect request.
#[async_trait]
pub trait CallbackResponder: Send + Sync {
    async fn respond(&self, request: &CallbackRequest) -> CallbackResponse;
}

/// Answers every redirect with a bare status (200 by default).
#[derive(Debug, Clone, Copy)]
pub struct StatusResponder(pub StatusCode);

impl Default for StatusResponder {
    fn default() -> Self {
        Self(StatusCode::OK)
    }
}

#[async_trait]
impl CallbackResponder for StatusResponder {
    async fn respond(&self, _request: &CallbackRequest) -> CallbackResponse {
        CallbackResponse::status(self.0)
    }
}

/// Answers with a small HTML page telling the user whether consent went through.
#[derive(Debug, Clone)]
pub struct HtmlResponder {
    app_name: String,
}

impl HtmlResponder {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl CallbackResponder for HtmlResponder {
    async fn respond(&self, request: &CallbackRequest) -> CallbackResponse {
        match (request.code(), request.error()) {
            (Some(_), None) => CallbackResponse::html(StatusCode::OK, success_html(&self.app_name)),
            (_, Some(error)) => CallbackResponse::html(
                StatusCode::BAD_REQUEST,
                error_html(&self.app_name, &error),
            ),
            (None, None) => CallbackResponse::html(
                StatusCode::BAD_REQUEST,
                error_html(&self.app_name, "missing_code"),
            ),
        }
    }
}

pub fn success_html(app_name: &str) -> String {
    let app = html_escape(app_name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Authorization complete</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 2rem;">
    <h1>Authorization complete</h1>
    <p>{app} is now connected. You can close this window.</p>
</body>
</html>"#
    )
}

pub fn error_html(app_name: &str, error: &str) -> String {
    let app = html_escape(app_name);
    let error_code = html_escape(error);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Authorization failed</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 2rem;">
    <h1>Authorization failed</h1>
    <p>{app} was not connected.</p>
    <p><strong>Error:</strong> <code>{error_code}</code></p>
    <p>Close this window and try again.</p>
</body>
</html>"#
    )
}

/// Simple HTML escaping to prevent XSS.
fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// =============================================================================
// Listener
// =============================================================================

/// Configuration for the embedded redirect listener.
#[derive(Clone)]
pub struct CallbackListener {
    host: IpAddr,
    port: u16,
    responder: Arc<dyn CallbackResponder>,
}

impl std::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackListener")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl CallbackListener {
    /// Listen on all interfaces at `port`, answering with a bare 200.
    pub fn new(port: u16) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            responder: Arc::new(StatusResponder::default()),
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_responder(mut self, responder: impl CallbackResponder + 'static) -> Self {
        self.responder = Arc::new(responder);
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Bind the socket without waiting for a request yet.
    pub async fn bind(&self) -> Result<BoundCallbackListener> {
        let listener = TcpListener::bind(SocketAddr::new(self.host, self.port)).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "Waiting for authorization redirect");
        Ok(BoundCallbackListener {
            listener,
            local_addr,
            responder: Arc::clone(&self.responder),
        })
    }
}

/// Validate the redirect against the issued state and pull out the code.
///
/// Returns `Ok(None)` when the redirect had no code. A `state` parameter that
/// does not match `expected`, or a provider `error` parameter, is rejected
/// as [`AuthError::AuthorizationDenied`].
pub fn code_from_request(request: &CallbackRequest, expected: &StateToken) -> Result<Option<String>> {
    match request.state() {
        Some(echoed) if !expected.matches(&echoed) => {
            warn!("Redirect state does not match the issued state");
            return Err(AuthError::denied("state mismatch in authorization redirect"));
        }
        None => debug!("Redirect carried no state parameter"),
        _ => {}
    }

    if let Some(error) = request.error() {
        warn!(%error, "Provider reported an authorization error");
        return Err(AuthError::denied(error));
    }

    Ok(request.code())
}

/// A bound listener waiting for its single request.
pub struct BoundCallbackListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    responder: Arc<dyn CallbackResponder>,
}

impl BoundCallbackListener {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept exactly one connection, answer it, and close the listener.
    ///
    /// Consumes `self`: the socket is closed when this returns, whatever
    /// the outcome.
    #[instrument(skip_all, fields(local_addr = %self.local_addr))]
    pub async fn receive(self) -> Result<CallbackRequest> {
        let (mut socket, peer) = self.listener.accept().await?;
        debug!(%peer, "Accepted redirect connection");

        let head = read_request_head(&mut socket).await?;
        if head.is_empty() {
            let _ = socket.shutdown().await;
            warn!(%peer, "Redirect connection closed without a request");
            return Err(AuthError::denied("connection closed before a request was received"));
        }

        let Some(request) = CallbackRequest::parse(&head) else {
            let _ = socket
                .write_all(CallbackResponse::status(StatusCode::BAD_REQUEST).to_http().as_bytes())
                .await;
            let _ = socket.shutdown().await;
            return Err(AuthError::denied("malformed authorization redirect"));
        };

        let response = if request.method.eq_ignore_ascii_case("GET") {
            self.responder.respond(&request).await
        } else {
            CallbackResponse::status(StatusCode::METHOD_NOT_ALLOWED)
        };

        if let Err(e) = socket.write_all(response.to_http().as_bytes()).await {
            debug!(error = %e, "Failed to write redirect response");
        }
        let _ = socket.shutdown().await;

        if !request.method.eq_ignore_ascii_case("GET") {
            return Err(AuthError::denied(format!(
                "unexpected {} request on redirect listener",
                request.method
            )));
        }

        Ok(request)
    }
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> Result<String> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
