//! The handler contract shared by chain links and state nodes.

/// What a handler decided about a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The handler satisfied the request; dispatch stops here.
    Accept,
    /// The handler declines; dispatch moves to the next link or the
    /// next keyed state.
    Pass,
}

impl Verdict {
    /// Static label for log fields.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Pass => "pass",
        }
    }
}

/// A unit of behavior composed into chains and transition runs.
///
/// `R` is the request/context type threaded through a dispatch.
/// Handlers decide *locally* whether they can satisfy the request;
/// the surrounding [`Chain`](crate::chain::Chain) or
/// [`Driver`](crate::transitions::Driver) owns the wiring.
///
/// `handle` takes `&self` so built compositions can be shared and
/// dispatched through a plain reference. Mutable state belongs on the
/// request; a handler that needs private state keeps it behind interior
/// mutability (an atomic or a lock).
pub trait Handler<R>: Send + Sync {
    /// Inspect (and possibly mutate) the request, then report whether
    /// it was satisfied.
    fn handle(&self, request: &mut R) -> Verdict;
}

impl<R> core::fmt::Debug for dyn Handler<R> + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("<dyn Handler>")
    }
}

/// Adapter turning a closure into a [`Handler`]. Keeps registries and
/// tests free of one-off unit structs. Build one with [`handler_fn`].
pub struct HandlerFn<F>(F);

/// Wrap a closure as a handler.
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn(f)
}

impl<R, F> Handler<R> for HandlerFn<F>
where
    F: Fn(&mut R) -> Verdict + Send + Sync,
{
    fn handle(&self, request: &mut R) -> Verdict {
        (self.0)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_acts_as_handler() {
        let seen = Mutex::new(Vec::new());
        let h = handler_fn(|req: &mut u32| {
            seen.lock().unwrap().push(*req);
            if *req <= 3 { Verdict::Accept } else { Verdict::Pass }
        });
        assert_eq!(h.handle(&mut 2), Verdict::Accept);
        assert_eq!(h.handle(&mut 9), Verdict::Pass);
        drop(h);
        assert_eq!(seen.into_inner().unwrap(), vec![2, 9]);
    }

    #[test]
    fn handlers_dispatch_through_shared_references() {
        let h = handler_fn(|req: &mut u32| {
            if *req == 0 { Verdict::Accept } else { Verdict::Pass }
        });
        let shared: &dyn Handler<u32> = &h;
        assert_eq!(shared.handle(&mut 0), Verdict::Accept);
        assert_eq!(shared.handle(&mut 1), Verdict::Pass);
    }

    #[test]
    fn verdict_labels() {
        assert_eq!(Verdict::Accept.as_str(), "accept");
        assert_eq!(Verdict::Pass.as_str(), "pass");
    }
}
