//! Runs a streaming-style handler against a platform with atomic responses.
//!
//! One call to [`listen`] covers one request: the platform request is wrapped
//! in an [`IncomingMessage`], the handler writes into a [`ServerResponse`],
//! and once the response is finished it is flushed to the platform response
//! in a single hand-off.

use log::debug;
use std::future::Future;

use crate::{
    error::Error,
    incoming::IncomingMessage,
    request::{NowRequest, PlatformRequest},
    response::{PlatformResponse, ResponseWriter},
    server_response::ServerResponse,
};

/// Functions handling one interaction request must conform to this type.
///
/// The handler must eventually call [`ServerResponse::finish`], either before
/// its future resolves or from elsewhere afterwards. A response that is never
/// finished leaves [`listen`] waiting forever.
pub trait Handler {
    type Fut: Future<Output = Result<(), Error>>;

    /// Run the handler.
    fn run(&mut self, req: IncomingMessage, res: ServerResponse) -> Self::Fut;
}

impl<F, Fut> Handler for F
where
    F: FnMut(IncomingMessage, ServerResponse) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    type Fut = Fut;

    fn run(&mut self, req: IncomingMessage, res: ServerResponse) -> Fut {
        (*self)(req, res)
    }
}

/// The adapter surface an interaction framework is written against.
pub trait HttpAdapter {
    type Request: PlatformRequest + 'static;
    type Response: PlatformResponse;

    /// Serve one request with `handler` and return the platform's result.
    fn listen<H>(
        &self,
        endpoint: &str,
        handler: H,
        request: Self::Request,
        response: Self::Response,
    ) -> impl Future<Output = Result<<Self::Response as PlatformResponse>::Output, Error>>
    where
        H: Handler;

    /// Reads the request body as bytes.
    fn get_request_body(&self, req: &IncomingMessage) -> Vec<u8> {
        get_request_body(req)
    }
}

/// [`HttpAdapter`] for Now Lambda functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NowAdapter;

impl HttpAdapter for NowAdapter {
    type Request = NowRequest;
    type Response = ResponseWriter;

    async fn listen<H>(
        &self,
        endpoint: &str,
        handler: H,
        request: NowRequest,
        response: ResponseWriter,
    ) -> Result<<ResponseWriter as PlatformResponse>::Output, Error>
    where
        H: Handler,
    {
        listen(endpoint, handler, request, response).await
    }
}

/// Serves one request.
///
/// `endpoint` only names the request in logs; there is a single endpoint per
/// function. Errors returned by the handler propagate as-is and nothing is
/// written to `response`.
pub async fn listen<H, P, R>(
    endpoint: &str,
    mut handler: H,
    request: P,
    response: R,
) -> Result<R::Output, Error>
where
    H: Handler,
    P: PlatformRequest + 'static,
    R: PlatformResponse,
{
    let req = IncomingMessage::new(request);
    debug!("{}: {} {}", endpoint, req.method(), req.url());

    let res = ServerResponse::new();
    handler.run(req, res.clone()).await?;
    res.wait_for_completion().await;
    Ok(res.flush_to(response)?)
}

/// Reads the request body as bytes; empty when there is no usable body.
pub fn get_request_body(req: &IncomingMessage) -> Vec<u8> {
    req.array_buffer()
}
