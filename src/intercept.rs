//! Interception proxies: wrap a target behind its capability set and
//! route every call through an interceptor.
//!
//! There is no code generation here. [`Intercepted`] is a plain
//! delegate holding the target and the interceptor, both private.
//! Callers define the capability set as an ordinary trait and implement
//! it for `Intercepted<T, I>`, each method body being a one-line call
//! into [`Intercepted::route`] — the single shared interception
//! routine. Because the wrapper exposes nothing but those impls,
//! capability narrowing holds by construction: extra members on the
//! concrete target are unreachable through the proxy.
//!
//! The interceptor alone decides whether, when, and how many times the
//! real call runs. A failure produced *by the real call* travels inside
//! the call's normal return value and keeps its identity; only a fault
//! in the interceptor itself becomes
//! [`WeftError::InterceptionFailed`](crate::error::WeftError).

use crate::error::{BoxError, WeftError, WeftResult};
use crate::handler::{Handler, Verdict};
use tracing::warn;

/// A single intercepted invocation.
///
/// Carries the method name, a borrow of the arguments, and the bound
/// real call. `proceed` may be invoked zero, one, or several times.
pub struct Call<'a, A, O> {
    method: &'static str,
    args: &'a A,
    real: &'a mut dyn FnMut(&A) -> O,
}

impl<'a, A, O> Call<'a, A, O> {
    /// Name of the intercepted method.
    #[inline]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The invocation's arguments.
    #[inline]
    pub fn args(&self) -> &A {
        self.args
    }

    /// Perform the real call against the target and return its result.
    ///
    /// If the target's method is fallible, its error comes back inside
    /// `O` untouched.
    #[inline]
    pub fn proceed(&mut self) -> O {
        (self.real)(self.args)
    }
}

/// Caller-supplied interception logic.
///
/// `A` is the argument tuple of the intercepted method, `O` its return
/// type. Returning `Err` means the interception machinery itself
/// faulted; the proxy surfaces that as `InterceptionFailed`.
pub trait Interceptor<A, O>: Send + Sync {
    /// Decide what to do with `call`: forward it, replace its result,
    /// run it several times, or refuse it outright.
    fn intercept(&self, call: Call<'_, A, O>) -> Result<O, BoxError>;
}

/// Adapter turning a plain function into an [`Interceptor`].
///
/// Build one with [`intercept_fn`].
pub struct InterceptFn<F>(F);

/// Wrap a function as an interceptor.
pub fn intercept_fn<F>(f: F) -> InterceptFn<F> {
    InterceptFn(f)
}

impl<A, O, F> Interceptor<A, O> for InterceptFn<F>
where
    F: for<'a> Fn(Call<'a, A, O>) -> Result<O, BoxError> + Send + Sync,
{
    fn intercept(&self, call: Call<'_, A, O>) -> Result<O, BoxError> {
        (self.0)(call)
    }
}

/// Interceptor that always forwards unmodified. A proxy wrapped with
/// `Passthrough` is observationally equivalent to the bare target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<A, O> Interceptor<A, O> for Passthrough {
    fn intercept(&self, mut call: Call<'_, A, O>) -> Result<O, BoxError> {
        Ok(call.proceed())
    }
}

/// A target paired with an interceptor, exposing only the capability
/// traits implemented for it.
pub struct Intercepted<T, I> {
    target: T,
    interceptor: I,
}

impl<T, I> Intercepted<T, I> {
    /// Bind `target` and `interceptor`. The binding is immutable: every
    /// call for the proxy's lifetime goes through the same interceptor.
    pub fn wrap(target: T, interceptor: I) -> Self {
        Self { target, interceptor }
    }

    /// Dissolve the proxy, recovering the target and interceptor.
    pub fn into_inner(self) -> (T, I) {
        (self.target, self.interceptor)
    }

    /// The shared interception routine capability impls call into.
    ///
    /// Binds `real` over the target and arguments, then hands the
    /// interceptor full control of the invocation.
    pub fn route<A, O>(
        &self,
        method: &'static str,
        args: A,
        mut real: impl FnMut(&T, &A) -> O,
    ) -> WeftResult<O>
    where
        I: Interceptor<A, O>,
    {
        let target = &self.target;
        let mut bound = move |a: &A| real(target, a);
        let call = Call {
            method,
            args: &args,
            real: &mut bound,
        };
        self.interceptor
            .intercept(call)
            .map_err(|source| WeftError::InterceptionFailed { method, source })
    }

    /// Like [`route`](Self::route) for capabilities needing `&mut`
    /// access to the target.
    pub fn route_mut<A, O>(
        &mut self,
        method: &'static str,
        args: A,
        mut real: impl FnMut(&mut T, &A) -> O,
    ) -> WeftResult<O>
    where
        I: Interceptor<A, O>,
    {
        let target = &mut self.target;
        let mut bound = move |a: &A| real(target, a);
        let call = Call {
            method,
            args: &args,
            real: &mut bound,
        };
        self.interceptor
            .intercept(call)
            .map_err(|source| WeftError::InterceptionFailed { method, source })
    }
}

/// A proxied handler is still a handler, so chain links and state nodes
/// can be wrapped without the dispatcher knowing.
///
/// A faulting interceptor has no error channel in the `Handler`
/// contract; the link logs the fault and passes the request on.
impl<R, T, I> Handler<R> for Intercepted<T, I>
where
    T: Handler<R>,
    I: Interceptor<(), Verdict>,
{
    fn handle(&self, request: &mut R) -> Verdict {
        let outcome = self.route("handle", (), |target, _args| target.handle(&mut *request));
        match outcome {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "intercepted handler faulted; passing");
                Verdict::Pass
            }
        }
    }
}
