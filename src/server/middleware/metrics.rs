//! Metrics middleware for request monitoring

use crate::monitoring::GatewayMetrics;
use actix_web::body::{BodySize, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use bytes::Bytes;
use futures::future::{Ready, ready};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tracing::debug;

/// Path excluded from request metrics
const METRICS_PATH: &str = "/metrics";

/// Route label for requests that matched no resource
const UNMATCHED_ROUTE: &str = "unmatched";

/// Metrics middleware for Actix-web
///
/// Times every request and records it under its route pattern, so path
/// parameters do not explode label cardinality. Streaming responses are
/// recorded when their body ends, not when the head is sent.
pub struct MetricsMiddleware {
    metrics: Arc<GatewayMetrics>,
}

impl MetricsMiddleware {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<TimedBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service,
            metrics: Arc::clone(&self.metrics),
        }))
    }
}

/// Service implementation for metrics middleware
pub struct MetricsMiddlewareService<S> {
    service: S,
    metrics: Arc<GatewayMetrics>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<TimedBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.path() == METRICS_PATH {
            let fut = self.service.call(req);
            return Box::pin(async move {
                fut.await
                    .map(|res| res.map_body(|_, body| TimedBody::new(body, None)))
            });
        }

        let start_time = Instant::now();
        let method = req.method().to_string();
        let metrics = Arc::clone(&self.metrics);
        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            let route = res
                .request()
                .match_pattern()
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
            let record = PendingRecord {
                metrics,
                method,
                route,
                status: res.status().as_u16(),
                start_time,
            };

            if matches!(res.response().body().size(), BodySize::Stream) {
                Ok(res.map_body(|_, body| TimedBody::new(body, Some(record))))
            } else {
                record.finish();
                Ok(res.map_body(|_, body| TimedBody::new(body, None)))
            }
        })
    }
}

/// Request measurement waiting for its body to end
struct PendingRecord {
    metrics: Arc<GatewayMetrics>,
    method: String,
    route: String,
    status: u16,
    start_time: Instant,
}

impl PendingRecord {
    fn finish(self) {
        let elapsed = self.start_time.elapsed();
        self.metrics
            .record_request(&self.method, &self.route, self.status, elapsed);
        debug!(
            "{} {} -> {} in {:?}",
            self.method, self.route, self.status, elapsed
        );
    }
}

pin_project! {
    /// Response body that records its request once the body is finished or dropped
    pub struct TimedBody<B> {
        #[pin]
        body: B,
        pending: Option<PendingRecord>,
    }

    impl<B> PinnedDrop for TimedBody<B> {
        fn drop(this: Pin<&mut Self>) {
            // Client went away mid-stream
            if let Some(record) = this.project().pending.take() {
                record.finish();
            }
        }
    }
}

impl<B> TimedBody<B> {
    fn new(body: B, pending: Option<PendingRecord>) -> Self {
        Self { body, pending }
    }
}

impl<B: MessageBody> MessageBody for TimedBody<B> {
    type Error = B::Error;

    fn size(&self) -> BodySize {
        self.body.size()
    }

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        let this = self.project();
        let polled = this.body.poll_next(cx);
        if let Poll::Ready(None) = polled {
            if let Some(record) = this.pending.take() {
                record.finish();
            }
        }
        polled
    }
}
