//! Serve Discord-style interaction handlers from Now Lambda functions.
//!
//! Interaction frameworks are written against a streaming request/response
//! pair, while a Now function has to hand back its whole response at once.
//! [`listen`] bridges the two by buffering the handler's response and
//! committing it in one step.

pub use http::{self, HeaderMap, StatusCode};
use lambda_runtime::{self as lambda, service_fn, LambdaEvent};
use log::error;
use tokio::runtime::Runtime as TokioRuntime;

mod adapter;
mod body;
mod error;
mod incoming;
pub mod request;
pub mod response;
mod server_response;
mod strmap;

pub use crate::{
    adapter::{get_request_body, listen, Handler, HttpAdapter, NowAdapter},
    body::Body,
    error::{BodyError, Error, ResponseError},
    incoming::IncomingMessage,
    server_response::ServerResponse,
    strmap::{HeaderValue, StrMap},
};
use crate::{
    request::{NowEvent, NowRequest},
    response::{NowResponse, ResponseWriter},
};

/// Endpoint name used by the [`lambda!`] macro.
pub const DEFAULT_ENDPOINT: &str = "interactions";

/// Handles a single Now event with `handler`.
pub async fn handle_event<H>(endpoint: &str, handler: H, event: NowEvent) -> Result<NowResponse, Error>
where
    H: Handler,
{
    let req: NowRequest = serde_json::from_str(&event.body).map_err(|e| {
        error!("Could not deserialize event body to NowRequest {}", e);
        e
    })?;
    listen(endpoint, handler, req, ResponseWriter::default()).await
}

/// Polls for Now Lambda events until the runtime shuts down.
///
/// Each event gets its own clone of `handler`.
pub async fn run<H>(endpoint: &'static str, handler: H) -> Result<(), Error>
where
    H: Handler + Clone + Send + 'static,
    H::Fut: Send,
{
    lambda::run(service_fn(move |event: LambdaEvent<NowEvent>| {
        handle_event(endpoint, handler.clone(), event.payload)
    }))
    .await
}

/// Creates a tokio runtime, unless one is given, and blocks polling for Now
/// Lambda events.
///
/// # Arguments
///
/// * `endpoint` Name of the single endpoint served, used in logs.
/// * `f` A type that conforms to the `Handler` interface.
/// * `runtime` Runtime to block on instead of a fresh one.
pub fn start<H>(endpoint: &'static str, f: H, runtime: Option<TokioRuntime>) -> Result<(), Error>
where
    H: Handler + Clone + Send + 'static,
    H::Fut: Send,
{
    let runtime = match runtime {
        Some(rt) => rt,
        None => TokioRuntime::new()?,
    };
    runtime.block_on(run(endpoint, f))
}

/// A macro for starting a handler's poll for Now events
#[macro_export]
macro_rules! lambda {
    ($handler:expr) => {
        $crate::start($crate::DEFAULT_ENDPOINT, $handler, None)
    };
    ($handler:expr, $runtime:expr) => {
        $crate::start($crate::DEFAULT_ENDPOINT, $handler, Some($runtime))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(request: serde_json::Value) -> NowEvent {
        NowEvent {
            action: "Invoke".into(),
            body: request.to_string(),
        }
    }

    async fn pong(req: IncomingMessage, res: ServerResponse) -> Result<(), Error> {
        let body: serde_json::Value = match serde_json::from_slice(&get_request_body(&req)) {
            Ok(body) => body,
            Err(_) => {
                res.set_status_and_headers(StatusCode::UNAUTHORIZED, None)?;
                return Ok(res.finish("invalid request")?);
            }
        };
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, "application/json".parse()?);
        res.set_status_and_headers(StatusCode::OK, Some(headers))?;
        res.finish(json!({ "type": body["type"] }).to_string())?;
        Ok(())
    }

    #[tokio::test]
    async fn handles_now_event() {
        let _ = simple_logger::init_with_level(log::Level::Debug);

        let res = handle_event(
            DEFAULT_ENDPOINT,
            pong,
            event(json!({
                "host": "bot.now.sh",
                "path": "/api/interactions",
                "method": "POST",
                "headers": {"content-type": "application/json"},
                "body": "{\"type\":1}",
            })),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(res).unwrap(),
            json!({
                "statusCode": 200,
                "headers": {"content-type": "application/json", "content-length": "10"},
                "body": "{\"type\":1}",
            })
        );
    }

    #[tokio::test]
    async fn text_request_gets_no_body() {
        let res = handle_event(
            DEFAULT_ENDPOINT,
            pong,
            event(json!({
                "path": "/api/interactions",
                "headers": {"content-type": "text/plain"},
                "body": "{\"type\":1}",
            })),
        )
        .await
        .unwrap();

        assert_eq!(res.status_code, 401);
        assert_eq!(res.body.as_deref(), Some("invalid request"));
    }

    #[tokio::test]
    async fn undecodable_event_is_an_error() {
        let res = handle_event(
            DEFAULT_ENDPOINT,
            pong,
            NowEvent {
                action: "Invoke".into(),
                body: "not json".into(),
            },
        )
        .await;
        assert!(res.is_err());
    }
}
