//! Interceptor traits and the ordered pipeline that runs them
//!
//! Interceptors are registered explicitly in order and run sequentially for
//! each request. Both traits return boxed futures so the pipeline can hold
//! them as `Arc<dyn ...>`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use navigation::Navigator;
use session_store::CredentialStore;
use tracing::trace;

use crate::bearer::{BearerAuth, SelectionPolicy};
use crate::failure::RequestFailure;
use crate::invalidate::SessionInvalidator;
use crate::request::PendingRequest;

/// Boxed, sendable future used by interceptor methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Decorates a request before dispatch.
///
/// Must not fail: an interceptor that cannot do its job leaves the request
/// as it found it.
pub trait RequestInterceptor: Send + Sync {
    /// Identifier for logging
    fn id(&self) -> &str;

    fn intercept<'a>(&'a self, request: &'a mut PendingRequest) -> BoxFuture<'a, ()>;
}

/// Observes a failed request before the failure is returned to the caller.
///
/// Side effects only; the failure itself is never altered or swallowed.
pub trait ResponseInterceptor: Send + Sync {
    /// Identifier for logging
    fn id(&self) -> &str;

    fn on_failure<'a>(
        &'a self,
        request: &'a PendingRequest,
        failure: &'a RequestFailure,
    ) -> BoxFuture<'a, ()>;
}

/// Ordered request and response interceptors.
#[derive(Clone, Default)]
pub struct Pipeline {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard session pipeline: bearer attachment on the way out,
    /// credential invalidation and login redirect on a 401.
    pub fn session(
        store: Arc<CredentialStore>,
        navigator: Arc<Navigator>,
        policy: SelectionPolicy,
    ) -> Self {
        Self::new()
            .with_request(BearerAuth::new(store.clone(), policy))
            .with_response(SessionInvalidator::new(store, navigator))
    }

    pub fn with_request(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.request.push(Arc::new(interceptor));
        self
    }

    pub fn with_response(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.response.push(Arc::new(interceptor));
        self
    }

    /// Run request interceptors in registration order.
    pub async fn prepare(&self, request: &mut PendingRequest) {
        for interceptor in &self.request {
            trace!(interceptor = interceptor.id(), "request interceptor");
            interceptor.intercept(request).await;
        }
    }

    /// Run response interceptors in registration order.
    pub async fn observe(&self, request: &PendingRequest, failure: &RequestFailure) {
        for interceptor in &self.response {
            trace!(interceptor = interceptor.id(), "response interceptor");
            interceptor.on_failure(request, failure).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};
    use std::sync::Mutex;

    struct Tag(&'static str);

    impl RequestInterceptor for Tag {
        fn id(&self) -> &str {
            self.0
        }

        fn intercept<'a>(&'a self, request: &'a mut PendingRequest) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                let name = HeaderName::from_static("x-trail");
                let trail = match request.headers.get(&name) {
                    Some(v) => format!("{},{}", v.to_str().unwrap(), self.0),
                    None => self.0.to_string(),
                };
                request
                    .headers
                    .insert(name, HeaderValue::from_str(&trail).unwrap());
            })
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl ResponseInterceptor for Arc<Recorder> {
        fn id(&self) -> &str {
            "recorder"
        }

        fn on_failure<'a>(
            &'a self,
            request: &'a PendingRequest,
            failure: &'a RequestFailure,
        ) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                self.0
                    .lock()
                    .unwrap()
                    .push(format!("{} {}", request.url, failure.status().unwrap_or(0)));
            })
        }
    }

    #[tokio::test]
    async fn request_interceptors_run_in_order() {
        let pipeline = Pipeline::new().with_request(Tag("a")).with_request(Tag("b"));
        let mut request = PendingRequest::get("/user/info/");
        pipeline.prepare(&mut request).await;
        assert_eq!(request.headers.get("x-trail").unwrap(), "a,b");
    }

    #[tokio::test]
    async fn empty_pipeline_leaves_request_untouched() {
        let pipeline = Pipeline::new();
        let mut request = PendingRequest::get("/user/info/");
        pipeline.prepare(&mut request).await;
        assert!(request.headers.is_empty());
    }

    #[tokio::test]
    async fn response_interceptors_see_every_failure() {
        let recorder = Arc::new(Recorder::default());
        let pipeline = Pipeline::new()
            .with_response(recorder.clone())
            .with_response(recorder.clone());
        let request = PendingRequest::get("/chat/send");
        let failure = RequestFailure::from_status(500, "/chat/send", "");
        pipeline.observe(&request, &failure).await;

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen, vec!["/chat/send 500", "/chat/send 500"]);
    }
}
