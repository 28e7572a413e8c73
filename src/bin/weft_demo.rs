//! weft-demo — wire the classic leave-approval chain and order-state
//! walk from a TOML file and run them.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weft::{
    ChainBuilder, Config, Driver, Outcome, Registry, TransitionTable, Verdict, handler_fn,
};

/// Chain request: days of leave asked for.
struct LeaveRequest {
    days: u32,
}

/// A link that approves requests up to its limit.
struct Approver {
    role: &'static str,
    limit: u32,
}

impl weft::Handler<LeaveRequest> for Approver {
    fn handle(&self, request: &mut LeaveRequest) -> Verdict {
        if request.days <= self.limit {
            info!(role = self.role, days = request.days, "request approved");
            Verdict::Accept
        } else {
            Verdict::Pass
        }
    }
}

/// Transition request: an order accumulating its stage history.
#[derive(Default)]
struct Order {
    history: Vec<&'static str>,
}

fn stage(name: &'static str) -> impl Fn(&mut Order) -> Verdict {
    move |order: &mut Order| {
        info!(stage = name, "order stage");
        order.history.push(name);
        Verdict::Pass
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "contrib/weft.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    // Chain: who signs off on how many days of leave.
    let approvals: Registry<LeaveRequest> = Registry::new();
    approvals.register("manager", || {
        Ok(Box::new(Approver { role: "manager", limit: 3 }) as _)
    });
    approvals.register("leader", || {
        Ok(Box::new(Approver { role: "leader", limit: 7 }) as _)
    });
    approvals.register("director", || {
        Ok(Box::new(Approver { role: "director", limit: 10 }) as _)
    });

    let chain_cfg = config
        .chain("approval")
        .ok_or_else(|| anyhow::anyhow!("config defines no 'approval' chain"))?;
    let chain = ChainBuilder::new(&approvals).build(&chain_cfg.links)?;
    info!(links = ?chain.keys(), "approval chain built");

    for days in [1, 3, 7, 10, 20] {
        let mut request = LeaveRequest { days };
        match chain.dispatch(&mut request) {
            Outcome::Handled { key } => info!(days, approved_by = %key, "handled"),
            Outcome::Unhandled { traversed } => {
                info!(days, traversed, "nobody could approve this")
            }
        }
    }

    // Transitions: walk an order through its configured stages.
    let stages: Registry<Order> = Registry::new();
    stages.register("pending", || Ok(Box::new(handler_fn(stage("pending"))) as _));
    stages.register("paid", || Ok(Box::new(handler_fn(stage("paid"))) as _));
    stages.register("shipped", || Ok(Box::new(handler_fn(stage("shipped"))) as _));

    let table = TransitionTable::new();
    config.apply_transitions(&table);

    let mut order = Order::default();
    let visited = Driver::new(&stages, &table).run("pending", &mut order)?;
    info!(?visited, history = ?order.history, "order walk complete");

    Ok(())
}
