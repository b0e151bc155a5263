//! Command callbacks and middleware.
//!
//! Both are opaque functors from the core's perspective (§4.G): the server
//! only needs to know when to invoke them and in what order. `Fn` rather
//! than `async fn` because the spec requires middleware/callbacks to never
//! block on network I/O themselves (§5 "Suspension points").

use std::{collections::HashMap, panic::AssertUnwindSafe, sync::Arc};

use tcpproto_core::Request;
use tcpproto_proto::Response;

/// A command callback: invoked when an inbound request's `COMMAND` header
/// matches the key it was registered under.
pub type Callback = Arc<dyn Fn(&mut Request, &mut Response) + Send + Sync>;

/// A before- or after-response middleware functor.
pub type Middleware = Arc<dyn Fn(&mut Request, &mut Response) + Send + Sync>;

/// The server's command dispatch table and middleware chains.
///
/// Read-only once `Server::run` starts; the spec leaves mutation after
/// start undefined (§5 "Shared-resource policy"), so this type offers no
/// interior mutability.
#[derive(Clone, Default)]
pub struct Registry {
    callbacks: HashMap<String, Callback>,
    before: Vec<Middleware>,
    after: Vec<Middleware>,
}

impl Registry {
    /// An empty registry: no callbacks, no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback under `command`. Replaces any previous callback
    /// registered under the same key.
    pub fn on(&mut self, command: impl Into<String>, callback: Callback) -> &mut Self {
        self.callbacks.insert(command.into(), callback);
        self
    }

    /// Appends a before-response middleware, run after parsing and
    /// authentication, before callback dispatch (§4.G step 3).
    pub fn before_response(&mut self, middleware: Middleware) -> &mut Self {
        self.before.push(middleware);
        self
    }

    /// Appends an after-response middleware, run after callback dispatch
    /// (§4.G step 5).
    pub fn after_response(&mut self, middleware: Middleware) -> &mut Self {
        self.after.push(middleware);
        self
    }

    /// Runs every before-response middleware in registration order,
    /// catching any panic as an aborted exchange (§4.G, §9 "Panic/exception
    /// safety").
    ///
    /// # Errors
    ///
    /// Returns `Err` if any middleware panics.
    pub fn run_before(&self, request: &mut Request, response: &mut Response) -> Result<(), String> {
        run_guarded(&self.before, request, response)
    }

    /// Runs every after-response middleware in registration order, with the
    /// same panic-safety guarantee as [`Registry::run_before`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if any middleware panics.
    pub fn run_after(&self, request: &mut Request, response: &mut Response) -> Result<(), String> {
        run_guarded(&self.after, request, response)
    }

    /// Dispatches to the callback registered under `request`'s `COMMAND`
    /// header. Appends `NoCallback` to `response`'s error list if none is
    /// registered (§4.G step 4), and treats a callback panic the same way
    /// (§9).
    pub fn dispatch(&self, request: &mut Request, response: &mut Response) {
        let Some(command) = request.command() else {
            response.add_error("NoCallback");
            return;
        };
        let Some(callback) = self.callbacks.get(command) else {
            response.add_error("NoCallback");
            return;
        };
        let callback = Arc::clone(callback);
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| callback(request, response)));
        if result.is_err() {
            response.add_error("callback panicked");
        }
    }
}

fn run_guarded(
    chain: &[Middleware],
    request: &mut Request,
    response: &mut Response,
) -> Result<(), String> {
    for middleware in chain {
        let middleware = Arc::clone(middleware);
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| middleware(request, response)));
        if result.is_err() {
            return Err("middleware panicked".to_string());
        }
    }
    Ok(())
}
