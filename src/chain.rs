//! Responsibility chains: build an ordered linked structure from
//! registry keys, then dispatch requests down it.
//!
//! A chain is built once from the registry's current contents;
//! rebuilding constructs entirely fresh handler instances. Links own
//! their successor (`Box`), so a built chain is acyclic by
//! construction and immutable once returned.

use crate::error::{WeftError, WeftResult};
use crate::handler::{Handler, Verdict};
use crate::registry::Registry;
use tracing::{Level, debug, span};

#[derive(Debug)]
struct Link<R> {
    key: String,
    handler: Box<dyn Handler<R>>,
    next: Option<Box<Link<R>>>,
}

/// A singly-linked sequence of handler instances.
#[derive(Debug)]
pub struct Chain<R> {
    head: Link<R>,
    len: usize,
}

/// How a chain dispatch ended.
///
/// Exhaustion is an explicit variant rather than an error: whether an
/// unclaimed request is a failure is the caller's policy, not the
/// chain's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A link accepted the request.
    Handled {
        /// Key of the accepting link.
        key: String,
    },
    /// Every link passed.
    Unhandled {
        /// Number of links the request traversed.
        traversed: usize,
    },
}

impl Outcome {
    /// Whether some link accepted the request.
    #[inline]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

impl<R> Chain<R> {
    /// Number of links.
    pub fn len(&self) -> usize {
        self.len
    }

    /// A chain always has at least one link.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Link keys in chain order, head first.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len);
        let mut link = Some(&self.head);
        while let Some(l) = link {
            keys.push(l.key.as_str());
            link = l.next.as_deref();
        }
        keys
    }

    /// Walk the chain from the head until a link accepts or the chain
    /// is exhausted.
    ///
    /// Takes `&self`: a built chain may be dispatched through a shared
    /// reference, concurrently from several threads. Only the request
    /// is mutable.
    pub fn dispatch(&self, request: &mut R) -> Outcome {
        let mut link = Some(&self.head);
        let mut traversed = 0usize;
        while let Some(l) = link {
            traversed += 1;
            let link_span = span!(Level::DEBUG, "weft.link", key = %l.key);
            let verdict = {
                let _guard = link_span.enter();
                let verdict = l.handler.handle(request);
                debug!(verdict = verdict.as_str(), "link verdict");
                verdict
            };
            match verdict {
                Verdict::Accept => {
                    return Outcome::Handled { key: l.key.clone() };
                }
                Verdict::Pass => link = l.next.as_deref(),
            }
        }
        debug!(traversed, "chain exhausted without acceptance");
        Outcome::Unhandled { traversed }
    }
}

/// Builds chains from a registry.
pub struct ChainBuilder<'a, R> {
    registry: &'a Registry<R>,
}

impl<'a, R> ChainBuilder<'a, R> {
    /// Create a builder over `registry`.
    pub fn new(registry: &'a Registry<R>) -> Self {
        Self { registry }
    }

    /// Construct a fresh chain for `ordered_keys`.
    ///
    /// Fails fast: [`WeftError::EmptyChain`] for an empty list, and the
    /// first [`WeftError::UnknownKey`] / [`WeftError::ConstructionFailed`]
    /// encountered aborts the build with no partial chain escaping.
    pub fn build<K: AsRef<str>>(&self, ordered_keys: &[K]) -> WeftResult<Chain<R>> {
        if ordered_keys.is_empty() {
            return Err(WeftError::EmptyChain);
        }

        let mut resolved = Vec::with_capacity(ordered_keys.len());
        for key in ordered_keys {
            let key = key.as_ref();
            let handler = self.registry.resolve(key)?;
            resolved.push((key.to_string(), handler));
        }

        let len = resolved.len();
        // Link back-to-front so each link can own its successor.
        let mut next: Option<Box<Link<R>>> = None;
        for (key, handler) in resolved.into_iter().rev() {
            next = Some(Box::new(Link { key, handler, next }));
        }
        let head = *next.expect("non-empty key list produced no links");

        debug!(len, "chain built");
        Ok(Chain { head, len })
    }

    /// Construct a chain covering every registered key in registration
    /// order, mirroring a "build from current config" call.
    pub fn build_all(&self) -> WeftResult<Chain<R>> {
        self.build(&self.registry.snapshot())
    }
}
