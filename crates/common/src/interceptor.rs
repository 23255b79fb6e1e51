//! Transparent response-signing interceptor.
//!
//! [`SigningInterceptor`] wraps an arbitrary request handler so that every
//! response it produces carries `X-IOProof-*` signature headers, without the
//! handler knowing interception took place. Two handler shapes are supported:
//!
//! 1. **Sink handlers** ([`Handler`]) write a status and body into a
//!    [`ResponseSink`]. The interceptor substitutes a [`CaptureSink`] that
//!    forwards header changes to the real sink but buffers the status and
//!    body, signs, and then flushes everything to the real sink exactly once.
//! 2. **Response handlers** ([`AsyncHandler`]) return an owned
//!    [`http::Response`]; the interceptor signs it on the way out.
//!
//! Signing is best effort. A failure is logged and the response goes out
//! unsigned, with its status and body untouched.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use error_stack::Report;
use http::{HeaderMap, Request, Response, StatusCode};

use crate::error::IoProofError;
use crate::signing::{ExchangeSigner, SignatureHeaders};

/// Output capability shared by real response writers and the capture buffer.
pub trait ResponseSink {
    /// Response headers; may be modified until the status is written.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write the status line.
    fn write_head(&mut self, status: StatusCode);

    /// Append bytes to the response body.
    fn write(&mut self, chunk: &[u8]);
}

/// A request handler that writes its response into a sink.
pub trait Handler {
    fn handle(&self, request: &Request<Bytes>, sink: &mut dyn ResponseSink);
}

/// [`Handler`] backed by a closure. Built with [`handler_fn`].
#[derive(Debug, Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure as a [`Handler`].
#[must_use]
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request<Bytes>, &mut dyn ResponseSink),
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request<Bytes>, &mut dyn ResponseSink),
{
    fn handle(&self, request: &Request<Bytes>, sink: &mut dyn ResponseSink) {
        (self.f)(request, sink);
    }
}

/// A request handler that returns an owned response.
#[async_trait]
pub trait AsyncHandler: Send + Sync {
    async fn call(&self, request: Request<Bytes>) -> Response<Bytes>;
}

/// Request bodies the interceptor can buffer.
///
/// An absent body (`None`) is captured as an empty byte sequence.
pub trait IntoRequestBody {
    fn into_request_body(self) -> Bytes;
}

impl IntoRequestBody for Bytes {
    fn into_request_body(self) -> Bytes {
        self
    }
}

impl IntoRequestBody for Vec<u8> {
    fn into_request_body(self) -> Bytes {
        Bytes::from(self)
    }
}

impl IntoRequestBody for String {
    fn into_request_body(self) -> Bytes {
        Bytes::from(self)
    }
}

impl IntoRequestBody for &'static str {
    fn into_request_body(self) -> Bytes {
        Bytes::from_static(self.as_bytes())
    }
}

impl IntoRequestBody for &'static [u8] {
    fn into_request_body(self) -> Bytes {
        Bytes::from_static(self)
    }
}

impl<T: IntoRequestBody> IntoRequestBody for Option<T> {
    fn into_request_body(self) -> Bytes {
        self.map(IntoRequestBody::into_request_body)
            .unwrap_or_default()
    }
}

/// Sink substitute handed to downstream handlers.
///
/// Header changes pass straight through to the real sink. The first status
/// written is recorded and later ones are ignored; body bytes are buffered.
pub struct CaptureSink<'a> {
    inner: &'a mut dyn ResponseSink,
    status: Option<StatusCode>,
    body: BytesMut,
}

impl<'a> CaptureSink<'a> {
    #[must_use]
    pub fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self {
            inner,
            status: None,
            body: BytesMut::new(),
        }
    }

    /// Status recorded so far, if the handler wrote one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Release the real sink, returning the captured status (200 if none was
    /// written) and body.
    #[must_use]
    pub fn finish(self) -> (StatusCode, Bytes) {
        (self.status.unwrap_or(StatusCode::OK), self.body.freeze())
    }
}

impl ResponseSink for CaptureSink<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_head(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }
}

/// A [`ResponseSink`] that assembles an [`http::Response`].
///
/// Useful for driving sink handlers without a live server, and as the real
/// sink in frameworks that expect a response value.
#[derive(Debug, Default)]
pub struct HttpResponseSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl HttpResponseSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body.freeze());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for HttpResponseSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) {
        if let Some(existing) = self.status {
            log::warn!("Ignoring status {status}, response status already written as {existing}");
            return;
        }
        self.status = Some(status);
    }

    fn write(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }
}

/// Per-request capture of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedExchange {
    pub request: Bytes,
    pub response: Bytes,
    pub status: StatusCode,
}

/// Result of attempting to sign an exchange.
#[derive(Debug)]
pub enum SigningOutcome {
    /// Headers to attach to the response.
    Signed(SignatureHeaders),
    /// Signing failed; the response is sent without signature headers.
    Unsigned(Report<IoProofError>),
}

impl SigningOutcome {
    #[must_use]
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }

    /// Signature headers, if signing succeeded.
    #[must_use]
    pub fn headers(&self) -> Option<&SignatureHeaders> {
        match self {
            Self::Signed(headers) => Some(headers),
            Self::Unsigned(_) => None,
        }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        let Self::Signed(signature) = self else {
            return;
        };
        if let Err(e) = signature.insert_into(headers) {
            log::warn!("Failed to attach signature headers: {e:?}");
        }
    }
}

/// Wraps request handlers and signs every response they produce.
///
/// Holds no per-request state, so one interceptor can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct SigningInterceptor<S> {
    signer: S,
}

impl<S: ExchangeSigner> SigningInterceptor<S> {
    #[must_use]
    pub fn new(signer: S) -> Self {
        Self { signer }
    }

    #[must_use]
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Sign a captured exchange.
    ///
    /// Failures, including signature values that cannot be carried in HTTP
    /// headers, are logged and returned as [`SigningOutcome::Unsigned`].
    pub fn sign(&self, exchange: &InterceptedExchange) -> SigningOutcome {
        let signed = self
            .signer
            .sign_exchange(&exchange.request, &exchange.response)
            .and_then(|result| {
                let headers = SignatureHeaders::from(result);
                headers.to_header_values()?;
                Ok(headers)
            });

        match signed {
            Ok(headers) => {
                log::debug!(
                    "Signed response with key '{}' at {}",
                    headers.key_id,
                    headers.timestamp
                );
                SigningOutcome::Signed(headers)
            }
            Err(e) => {
                let e = e.attach(format!("key id: {}", self.signer.key_id()));
                log::warn!("Signing error, sending response unsigned: {e:?}");
                SigningOutcome::Unsigned(e)
            }
        }
    }

    /// Run `handler` for `request`, signing its output before it reaches `sink`.
    ///
    /// The handler sees an unconsumed copy of the request body and a capture
    /// sink in place of `sink`. Once it returns, the signature headers (if
    /// any) are set, then the status and body are written to `sink` exactly
    /// once.
    pub fn serve<B, H>(
        &self,
        request: Request<B>,
        handler: &H,
        sink: &mut dyn ResponseSink,
    ) -> SigningOutcome
    where
        B: IntoRequestBody,
        H: Handler + ?Sized,
    {
        let (parts, body) = request.into_parts();
        let request_body = body.into_request_body();
        let downstream = Request::from_parts(parts, request_body.clone());

        let mut capture = CaptureSink::new(sink);
        handler.handle(&downstream, &mut capture);
        let (status, response_body) = capture.finish();

        let exchange = InterceptedExchange {
            request: request_body,
            response: response_body,
            status,
        };
        let outcome = self.sign(&exchange);

        // Headers must be final before the status goes out.
        outcome.apply(sink.headers_mut());
        sink.write_head(exchange.status);
        sink.write(&exchange.response);

        outcome
    }

    /// Sign an already-produced response for `request_body`.
    ///
    /// Status and body are returned unchanged; only signature headers are added.
    pub fn sign_response(&self, request_body: &[u8], response: Response<Bytes>) -> Response<Bytes> {
        let (mut parts, body) = response.into_parts();
        let exchange = InterceptedExchange {
            request: Bytes::copy_from_slice(request_body),
            response: body,
            status: parts.status,
        };

        self.sign(&exchange).apply(&mut parts.headers);
        Response::from_parts(parts, exchange.response)
    }

    /// Run a response-returning handler and sign its response.
    pub async fn call<B, H>(&self, request: Request<B>, handler: &H) -> Response<Bytes>
    where
        B: IntoRequestBody,
        H: AsyncHandler + ?Sized,
    {
        let (parts, body) = request.into_parts();
        let request_body = body.into_request_body();

        let response = handler
            .call(Request::from_parts(parts, request_body.clone()))
            .await;
        self.sign_response(&request_body, response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use http::header::{HeaderValue, CONTENT_TYPE};

    use super::*;
    use crate::constants::{HEADER_X_IOPROOF_KEY_ID, HEADER_X_IOPROOF_SIG, HEADER_X_IOPROOF_SIG_TS};
    use crate::signing::test_vector as vector;
    use crate::signing::{digest_hex, verify_exchange, verify_signature, ResponseSigner, SignResult};

    fn vector_interceptor() -> SigningInterceptor<ResponseSigner> {
        SigningInterceptor::new(
            ResponseSigner::from_hex(vector::PRIVATE_KEY, vector::KEY_ID)
                .expect("should create signer"),
        )
    }

    fn post(body: &'static str) -> Request<&'static str> {
        Request::post("/v1/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .expect("should build request")
    }

    struct FailingSigner;

    impl ExchangeSigner for FailingSigner {
        fn key_id(&self) -> &str {
            "broken"
        }

        fn sign_exchange(
            &self,
            _request: &[u8],
            _response: &[u8],
        ) -> Result<SignResult, Report<IoProofError>> {
            Err(Report::new(IoProofError::signing("key service unavailable")))
        }
    }

    /// Real sink that records how often each operation happens.
    #[derive(Default)]
    struct RecordingSink {
        headers: HeaderMap,
        heads: Vec<StatusCode>,
        writes: Vec<Vec<u8>>,
        headers_at_head: Option<HeaderMap>,
    }

    impl ResponseSink for RecordingSink {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn write_head(&mut self, status: StatusCode) {
            self.headers_at_head = Some(self.headers.clone());
            self.heads.push(status);
        }

        fn write(&mut self, chunk: &[u8]) {
            self.writes.push(chunk.to_vec());
        }
    }

    #[test]
    fn test_serve_signs_and_preserves_response() {
        let interceptor = vector_interceptor();
        let handler = handler_fn(|_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            sink.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            sink.write_head(StatusCode::OK);
            sink.write(br#"{"ok":true}"#);
        });

        let mut sink = HttpResponseSink::new();
        let outcome = interceptor.serve(post(r#"{"test":true}"#), &handler, &mut sink);
        assert!(outcome.is_signed());

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#"{"ok":true}"#);
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );

        let headers =
            SignatureHeaders::from_headers(response.headers()).expect("should carry signature");
        assert_eq!(headers.key_id, vector::KEY_ID);
        assert!(verify_exchange(
            vector::PUBLIC_KEY,
            br#"{"test":true}"#,
            response.body(),
            &headers.timestamp,
            &headers.signature,
        ));
    }

    #[test]
    fn test_serve_flushes_exactly_once_after_headers() {
        let interceptor = vector_interceptor();
        let handler = handler_fn(|_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            sink.write_head(StatusCode::CREATED);
            sink.write(b"part one, ");
            sink.write(b"part two");
        });

        let mut sink = RecordingSink::default();
        interceptor.serve(post("{}"), &handler, &mut sink);

        assert_eq!(sink.heads, vec![StatusCode::CREATED]);
        assert_eq!(sink.writes, vec![b"part one, part two".to_vec()]);

        let at_head = sink.headers_at_head.expect("status should be written");
        assert!(at_head.contains_key(HEADER_X_IOPROOF_SIG));
        assert!(at_head.contains_key(HEADER_X_IOPROOF_SIG_TS));
        assert!(at_head.contains_key(HEADER_X_IOPROOF_KEY_ID));
    }

    #[test]
    fn test_serve_downstream_sees_unconsumed_body() {
        let interceptor = vector_interceptor();
        let handler = handler_fn(|req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            // Echo the request back so the test can see what downstream received.
            sink.write(req.body());
        });

        let mut sink = HttpResponseSink::new();
        interceptor.serve(post(vector::REQUEST_BODY), &handler, &mut sink);
        let response = sink.into_response();

        assert_eq!(response.body().as_ref(), vector::REQUEST_BODY.as_bytes());
    }

    #[test]
    fn test_serve_defaults_status_to_ok() {
        let interceptor = vector_interceptor();
        let handler = handler_fn(|_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            sink.write(b"no explicit status");
        });

        let mut sink = RecordingSink::default();
        interceptor.serve(post("{}"), &handler, &mut sink);

        assert_eq!(sink.heads, vec![StatusCode::OK]);
    }

    #[test]
    fn test_serve_first_status_wins() {
        let interceptor = vector_interceptor();
        let handler = handler_fn(|_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            sink.write_head(StatusCode::NOT_FOUND);
            sink.write_head(StatusCode::OK);
            sink.write(b"missing");
        });

        let mut sink = RecordingSink::default();
        interceptor.serve(post("{}"), &handler, &mut sink);

        assert_eq!(sink.heads, vec![StatusCode::NOT_FOUND]);
    }

    #[test]
    fn test_serve_absent_body_hashes_as_empty() {
        let interceptor = vector_interceptor();
        let handler = handler_fn(|req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            assert!(req.body().is_empty());
            sink.write(b"ok");
        });

        let request = Request::get("/health")
            .body(None::<Bytes>)
            .expect("should build request");
        let mut sink = HttpResponseSink::new();
        let outcome = interceptor.serve(request, &handler, &mut sink);

        let headers = outcome.headers().expect("should be signed");
        assert!(verify_exchange(
            vector::PUBLIC_KEY,
            b"",
            b"ok",
            &headers.timestamp,
            &headers.signature,
        ));
    }

    #[test]
    fn test_serve_signing_failure_sends_unsigned() {
        let interceptor = SigningInterceptor::new(FailingSigner);
        let handler = handler_fn(|_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            sink.write_head(StatusCode::OK);
            sink.write(br#"{"ok":true}"#);
        });

        let mut sink = HttpResponseSink::new();
        let outcome = interceptor.serve(post(r#"{"test":true}"#), &handler, &mut sink);
        assert!(matches!(
            outcome,
            SigningOutcome::Unsigned(ref e) if format!("{e:?}").contains("key id: broken")
        ));

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#"{"ok":true}"#);
        assert!(!response.headers().contains_key(HEADER_X_IOPROOF_SIG));
        assert!(!response.headers().contains_key(HEADER_X_IOPROOF_SIG_TS));
        assert!(!response.headers().contains_key(HEADER_X_IOPROOF_KEY_ID));
    }

    #[test]
    fn test_unencodable_key_id_degrades_to_unsigned() {
        let signer = ResponseSigner::from_hex(vector::PRIVATE_KEY, "bad\r\nkid")
            .expect("key id is not validated at construction");
        let interceptor = SigningInterceptor::new(signer);
        let handler = handler_fn(|_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
            sink.write(b"body");
        });

        let mut sink = HttpResponseSink::new();
        let outcome = interceptor.serve(post("{}"), &handler, &mut sink);

        assert!(matches!(
            outcome,
            SigningOutcome::Unsigned(ref e)
                if matches!(e.current_context(), IoProofError::SigningFailure { .. })
        ));
        let response = sink.into_response();
        assert_eq!(response.body().as_ref(), b"body");
        assert!(SignatureHeaders::from_headers(response.headers()).is_none());
    }

    #[test]
    fn test_sign_response_keeps_status_and_body() {
        let interceptor = vector_interceptor();
        let response = Response::builder()
            .status(StatusCode::ACCEPTED)
            .body(Bytes::from_static(vector::RESPONSE_BODY.as_bytes()))
            .expect("should build response");

        let signed = interceptor.sign_response(vector::REQUEST_BODY.as_bytes(), response);
        assert_eq!(signed.status(), StatusCode::ACCEPTED);
        assert_eq!(signed.body().as_ref(), vector::RESPONSE_BODY.as_bytes());

        let headers = SignatureHeaders::from_headers(signed.headers()).expect("should be signed");
        let message = format!(
            "ioproof:v1:{}|{}|{}",
            digest_hex(vector::REQUEST_BODY.as_bytes()),
            vector::RESPONSE_HASH,
            headers.timestamp
        );
        assert!(verify_signature(vector::PUBLIC_KEY, &message, &headers.signature));
    }

    struct JsonEcho {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AsyncHandler for JsonEcho {
        async fn call(&self, request: Request<Bytes>) -> Response<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, "application/json")
                .body(request.into_body())
                .expect("should build response")
        }
    }

    #[test]
    fn test_call_signs_async_handler_response() {
        let interceptor = vector_interceptor();
        let handler = JsonEcho {
            calls: AtomicUsize::new(0),
        };

        let response = tokio_test::block_on(interceptor.call(post(r#"{"test":true}"#), &handler));

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#"{"test":true}"#);

        let headers = SignatureHeaders::from_headers(response.headers()).expect("should be signed");
        assert!(verify_exchange(
            vector::PUBLIC_KEY,
            br#"{"test":true}"#,
            br#"{"test":true}"#,
            &headers.timestamp,
            &headers.signature,
        ));
    }

    #[test]
    fn test_call_with_failing_signer_returns_response_unchanged() {
        let interceptor = SigningInterceptor::new(FailingSigner);
        let handler = JsonEcho {
            calls: AtomicUsize::new(0),
        };

        let response = tokio_test::block_on(interceptor.call(post("payload"), &handler));

        assert_eq!(response.body().as_ref(), b"payload");
        assert!(SignatureHeaders::from_headers(response.headers()).is_none());
    }

    #[test]
    fn test_interceptor_shared_across_threads() {
        let interceptor = Arc::new(vector_interceptor());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let interceptor = Arc::clone(&interceptor);
                std::thread::spawn(move || {
                    let handler =
                        handler_fn(move |_req: &Request<Bytes>, sink: &mut dyn ResponseSink| {
                            sink.write(format!("response {i}").as_bytes());
                        });
                    let mut sink = HttpResponseSink::new();
                    interceptor.serve(post("{}"), &handler, &mut sink);
                    sink.into_response()
                })
            })
            .collect();

        for handle in handles {
            let response = handle.join().expect("thread should not panic");
            let headers =
                SignatureHeaders::from_headers(response.headers()).expect("should be signed");
            assert!(verify_exchange(
                vector::PUBLIC_KEY,
                b"{}",
                response.body(),
                &headers.timestamp,
                &headers.signature,
            ));
        }
    }

    #[test]
    fn test_http_response_sink_ignores_second_status() {
        let mut sink = HttpResponseSink::new();
        sink.write_head(StatusCode::BAD_REQUEST);
        sink.write_head(StatusCode::OK);
        assert_eq!(sink.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
