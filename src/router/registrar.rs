use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::dispatcher::ResponseWriter;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Name/value pairs captured by the external router. Names are shared with
/// the route table; lookups use last-write-wins.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path variables for one matched request.
pub type PathParams = ParamVec;

/// Inbound request as handed over by the external server.
pub type HttpRequest = http::Request<Vec<u8>>;

/// Callback the external router invokes for every matching request.
pub type RouteHandler =
    Arc<dyn Fn(&mut dyn ResponseWriter, &HttpRequest, &PathParams) + Send + Sync>;

/// Receiving end of endpoint registration: the HTTP router collaborator.
///
/// Path templates use literal segments and `:name` placeholders. Matching
/// requests against them is the implementor's job.
pub trait RouteRegistrar {
    fn register_route(&mut self, method: Method, path: &str, handler: RouteHandler);
}

/// One registration seen by a [`RouteCollector`].
#[derive(Clone)]
pub struct RegisteredRoute {
    pub method: Method,
    pub path: String,
    pub handler: RouteHandler,
}

impl std::fmt::Debug for RegisteredRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRoute")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Registrar that records every route so the host can mount them later.
///
/// Clones share the same table: keep one clone, hand the other to the `Api`.
#[derive(Clone, Default, Debug)]
pub struct RouteCollector {
    routes: Arc<Mutex<Vec<RegisteredRoute>>>,
}

impl RouteCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<RegisteredRoute> {
        self.routes.lock().clone()
    }

    /// Handler registered for exactly this method and path template.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteHandler> {
        self.routes
            .lock()
            .iter()
            .find(|r| r.method == *method && r.path == path)
            .map(|r| Arc::clone(&r.handler))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.lock().is_empty()
    }
}

impl RouteRegistrar for RouteCollector {
    fn register_route(&mut self, method: Method, path: &str, handler: RouteHandler) {
        self.routes.lock().push(RegisteredRoute {
            method,
            path: path.to_string(),
            handler,
        });
    }
}
