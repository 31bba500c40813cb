//! Serves the function over plain HTTP. Every path and method lands on one
//! handler that rebuilds the invocation event and returns its envelope.

use std::{collections::HashMap, future, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::{
    envelope::{Envelope, Invocation, InvocationContext},
    error::ReportError,
    service::ReportService,
    store::Connector,
};

const REQUEST_BODY_LIMIT: usize = 1024 * 1024;
const REQUEST_ID_HEADER: &str = "x-request-id";

type AppState<C> = Arc<ReportService<C>>;

pub fn router<C: Connector + 'static>(service: ReportService<C>) -> Router {
    Router::new()
        .fallback(invoke::<C>)
        .with_state(Arc::new(service))
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

pub async fn start_web_server<C: Connector + 'static>(
    service: ReportService<C>,
    addr: SocketAddr,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    log::info!("listening on http://{addr}");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("cannot listen for ctrl-c: {err}");
        future::pending::<()>().await;
    }
    log::info!("shutting down");
}

async fn invoke<C: Connector + 'static>(
    State(service): State<AppState<C>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match decode_body(body) {
        Ok(body) => body,
        Err(_) if method == Method::OPTIONS => String::new(),
        Err(err) => return Envelope::from(err).into_response(),
    };

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let event = Invocation {
        http_method: Some(method.to_string()),
        body: (!body.is_empty()).then_some(body),
        query_string_parameters: (!query.is_empty()).then_some(query),
    };

    service
        .handle(&event, &InvocationContext::new(request_id))
        .await
        .into_response()
}

/// Oversized and non-UTF-8 bodies are reported like any other bad body.
fn decode_body(body: Result<Bytes, BytesRejection>) -> Result<String, ReportError> {
    let bytes = body.map_err(|err| ReportError::InvalidBody(err.body_text()))?;
    String::from_utf8(bytes.to_vec()).map_err(|err| ReportError::InvalidBody(err.to_string()))
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut res = (status, self.body).into_response();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().insert(name, value);
                }
                _ => log::warn!("dropping invalid response header {name}"),
            }
        }
        res
    }
}
