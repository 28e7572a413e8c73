//! weft — runtime composition and interception.
//!
//! Decouples *what behavior runs* from *how it is wired together*:
//!
//! - [`Registry`]: symbolic key -> zero-argument handler factory.
//! - [`ChainBuilder`] / [`Chain`]: build a responsibility chain from an
//!   ordered key list and dispatch requests down it.
//! - [`TransitionTable`] / [`Driver`]: keyed state transitions with a
//!   bounded walk.
//! - [`Intercepted`]: behavioral proxying — wrap any target behind its
//!   capability set and route every call through an [`Interceptor`].
//!
//! The pieces compose: a chain link or state handler may itself be an
//! [`Intercepted`] proxy, and the dispatchers never know.
//!
//! ```
//! use weft::{ChainBuilder, Outcome, Registry, Verdict, handler_fn};
//!
//! let registry: Registry<u32> = Registry::new();
//! registry.register("small", || {
//!     Ok(Box::new(handler_fn(|req: &mut u32| {
//!         if *req <= 3 { Verdict::Accept } else { Verdict::Pass }
//!     })) as _)
//! });
//! registry.register("large", || {
//!     Ok(Box::new(handler_fn(|req: &mut u32| {
//!         if *req <= 10 { Verdict::Accept } else { Verdict::Pass }
//!     })) as _)
//! });
//!
//! let chain = ChainBuilder::new(&registry)
//!     .build(&["small", "large"])
//!     .unwrap();
//! assert_eq!(chain.dispatch(&mut 5), Outcome::Handled { key: "large".into() });
//! assert_eq!(chain.dispatch(&mut 20), Outcome::Unhandled { traversed: 2 });
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod handler;
pub mod intercept;
pub mod registry;
pub mod transitions;

pub use chain::{Chain, ChainBuilder, Outcome};
pub use config::{Config, ConfigError};
pub use error::{BoxError, WeftError, WeftResult};
pub use handler::{Handler, HandlerFn, Verdict, handler_fn};
pub use intercept::{Call, InterceptFn, Intercepted, Interceptor, Passthrough, intercept_fn};
pub use registry::{Factory, Registry};
pub use transitions::{DEFAULT_STEP_LIMIT, Driver, NextState, TransitionTable};
