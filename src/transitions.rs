//! State transition tables and the driver that walks them.
//!
//! The table maps a current-state key to its successor key. It is a
//! live, mutable structure: edits are visible to the very next lookup,
//! with no snapshotting. The table and the registry are independent
//! stores; an edge pointing at an unregistered key fails at resolution
//! time, not at insertion time.

use crate::error::{WeftError, WeftResult};
use crate::handler::{Handler, Verdict};
use crate::registry::Registry;
use dashmap::DashMap;
use tracing::{Level, debug, span, warn};

/// Default step limit for [`Driver::run`].
pub const DEFAULT_STEP_LIMIT: usize = 64;

/// Mapping from a state key to its successor key.
///
/// A key with no entry is terminal. Directed cycles are allowed; the
/// [`Driver`] guards against unbounded runs with a step limit.
#[derive(Default)]
pub struct TransitionTable {
    edges: DashMap<String, String>,
}

impl TransitionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the edge `from -> to`.
    pub fn add_transition(&self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.insert(from.into(), to.into());
    }

    /// Delete the outgoing edge of `from`, making it terminal. No-op if
    /// absent.
    pub fn remove_transition(&self, from: &str) {
        self.edges.remove(from);
    }

    /// Successor key of `from`, if any.
    pub fn successor(&self, from: &str) -> Option<String> {
        self.edges.get(from).map(|entry| entry.value().clone())
    }

    /// Whether `from` has no outgoing edge.
    pub fn is_terminal(&self, from: &str) -> bool {
        !self.edges.contains_key(from)
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the table has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Resolve the successor of `from` into a fresh handler instance.
    ///
    /// Returns `Ok(None)` when `from` is terminal. An edge whose target
    /// was never registered fails with [`WeftError::UnknownKey`] — the
    /// caller is responsible for keeping table and registry consistent.
    pub fn next_state<R>(
        &self,
        from: &str,
        registry: &Registry<R>,
    ) -> WeftResult<Option<NextState<R>>> {
        match self.successor(from) {
            None => Ok(None),
            Some(to) => {
                let handler = registry.resolve(&to)?;
                Ok(Some(NextState { key: to, handler }))
            }
        }
    }
}

/// A resolved successor state: its key and a fresh handler instance.
#[derive(Debug)]
pub struct NextState<R> {
    /// Key of the successor state.
    pub key: String,
    /// Freshly constructed handler for it.
    pub handler: Box<dyn Handler<R>>,
}

/// Walks a transition table from a starting state.
///
/// Each step constructs the state's handler via the registry, invokes
/// it, then follows the table to the successor. The run ends when a
/// state is terminal or a handler returns [`Verdict::Accept`] (early
/// halt). A step limit bounds runs over cyclic tables.
pub struct Driver<'a, R> {
    registry: &'a Registry<R>,
    table: &'a TransitionTable,
    step_limit: usize,
}

impl<'a, R> Driver<'a, R> {
    /// Create a driver over `registry` and `table` with the default
    /// step limit.
    pub fn new(registry: &'a Registry<R>, table: &'a TransitionTable) -> Self {
        Self {
            registry,
            table,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Override the step limit.
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Run from `start`, returning the visited state keys in order.
    ///
    /// Fails with [`WeftError::UnknownKey`] if `start` (or any edge
    /// target along the way) is not registered, and with
    /// [`WeftError::TransitionLimit`] if the table cycles past the step
    /// limit.
    pub fn run(&self, start: &str, request: &mut R) -> WeftResult<Vec<String>> {
        let mut current_key = start.to_string();
        let mut current = self.registry.resolve(&current_key)?;
        let mut visited = Vec::new();

        loop {
            if visited.len() >= self.step_limit {
                warn!(
                    limit = self.step_limit,
                    state = %current_key,
                    "transition run exceeded step limit"
                );
                return Err(WeftError::TransitionLimit {
                    limit: self.step_limit,
                });
            }

            let step_span = span!(Level::DEBUG, "weft.state", key = %current_key);
            let verdict = {
                let _guard = step_span.enter();
                let verdict = current.handle(request);
                debug!(verdict = verdict.as_str(), "state handled");
                verdict
            };
            visited.push(current_key.clone());

            if verdict == Verdict::Accept {
                // Early halt requested by the state itself.
                return Ok(visited);
            }

            match self.table.next_state(&current_key, self.registry)? {
                None => return Ok(visited),
                Some(next) => {
                    current_key = next.key;
                    current = next.handler;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;

    /// Records every state it passes through on the shared request.
    struct Trace(&'static str);

    impl Handler<Vec<&'static str>> for Trace {
        fn handle(&self, log: &mut Vec<&'static str>) -> Verdict {
            log.push(self.0);
            Verdict::Pass
        }
    }

    fn order_registry() -> Registry<Vec<&'static str>> {
        let registry = Registry::new();
        registry.register("pending", || Ok(Box::new(Trace("pending")) as _));
        registry.register("paid", || Ok(Box::new(Trace("paid")) as _));
        registry.register("shipped", || Ok(Box::new(Trace("shipped")) as _));
        registry
    }

    #[test]
    fn removed_transition_becomes_terminal() {
        let table = TransitionTable::new();
        table.add_transition("pending", "paid");
        assert_eq!(table.successor("pending").as_deref(), Some("paid"));
        table.remove_transition("pending");
        assert!(table.is_terminal("pending"));
        assert_eq!(table.successor("pending"), None);

        let registry = order_registry();
        assert!(table.next_state("pending", &registry).unwrap().is_none());
    }

    #[test]
    fn mutation_is_immediately_visible() {
        let table = TransitionTable::new();
        table.add_transition("pending", "paid");
        table.add_transition("pending", "shipped");
        assert_eq!(table.successor("pending").as_deref(), Some("shipped"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn edge_to_unregistered_key_fails_at_resolution() {
        let registry = order_registry();
        let table = TransitionTable::new();
        table.add_transition("pending", "refunded");
        let err = table.next_state("pending", &registry).unwrap_err();
        assert!(matches!(err, WeftError::UnknownKey { key } if key == "refunded"));
    }

    #[test]
    fn run_walks_until_terminal() {
        let registry = order_registry();
        let table = TransitionTable::new();
        table.add_transition("pending", "paid");
        table.add_transition("paid", "shipped");

        let mut log = Vec::new();
        let visited = Driver::new(&registry, &table)
            .run("pending", &mut log)
            .unwrap();
        assert_eq!(visited, vec!["pending", "paid", "shipped"]);
        assert_eq!(log, vec!["pending", "paid", "shipped"]);
    }

    #[test]
    fn inserted_state_joins_the_walk() {
        // Splice "processing" between paid and shipped without touching
        // either handler.
        let registry = order_registry();
        registry.register("processing", || Ok(Box::new(Trace("processing")) as _));
        let table = TransitionTable::new();
        table.add_transition("pending", "paid");
        table.add_transition("paid", "processing");
        table.add_transition("processing", "shipped");

        let mut log = Vec::new();
        let visited = Driver::new(&registry, &table)
            .run("pending", &mut log)
            .unwrap();
        assert_eq!(visited, vec!["pending", "paid", "processing", "shipped"]);
    }

    #[test]
    fn self_cycle_hits_step_limit() {
        let registry = order_registry();
        let table = TransitionTable::new();
        table.add_transition("pending", "pending");

        let mut log = Vec::new();
        let err = Driver::new(&registry, &table)
            .with_step_limit(5)
            .run("pending", &mut log)
            .unwrap_err();
        assert!(matches!(err, WeftError::TransitionLimit { limit: 5 }));
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn accepting_state_halts_early() {
        let registry = order_registry();
        registry.register("hold", || {
            Ok(Box::new(handler_fn(|log: &mut Vec<&'static str>| {
                log.push("hold");
                Verdict::Accept
            })) as _)
        });
        let table = TransitionTable::new();
        table.add_transition("pending", "hold");
        table.add_transition("hold", "shipped");

        let mut log = Vec::new();
        let visited = Driver::new(&registry, &table)
            .run("pending", &mut log)
            .unwrap();
        assert_eq!(visited, vec!["pending", "hold"]);
        assert_eq!(log, vec!["pending", "hold"]);
    }

    #[test]
    fn unknown_start_state_fails() {
        let registry = order_registry();
        let table = TransitionTable::new();
        let err = Driver::new(&registry, &table)
            .run("ghost", &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, WeftError::UnknownKey { key } if key == "ghost"));
    }
}
