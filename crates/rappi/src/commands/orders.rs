//! Order command handlers, including the polling `watch` loop.

use std::collections::HashSet;
use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use rappi_api::marketplace::Order;
use rappi_api::{CancelledOrderSummary, MarketplaceClient, OrderSummary};

use crate::cli::{GlobalOpts, OrdersArgs, OrdersCommand, OutputFormat};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Store")]
    store: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Units")]
    units: u32,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&OrderSummary> for OrderRow {
    fn from(s: &OrderSummary) -> Self {
        let customer = s
            .client
            .as_ref()
            .map(|c| {
                [c.first_name.as_deref(), c.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        Self {
            id: s.order.id.clone(),
            store: s
                .store
                .as_ref()
                .and_then(|st| st.name.clone().or_else(|| st.id.clone()))
                .unwrap_or_default(),
            customer,
            units: s.order.unit_count(),
            total: s
                .order
                .total_value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default(),
            payment: s.order.payment_method.clone().unwrap_or_default(),
            created: s.order.created_at.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CancelledRow {
    #[tabled(rename = "Order")]
    order_id: String,
    #[tabled(rename = "Store")]
    store_id: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&CancelledOrderSummary> for CancelledRow {
    fn from(c: &CancelledOrderSummary) -> Self {
        Self {
            order_id: c.order_id.clone().unwrap_or_default(),
            store_id: c.store_id.clone().unwrap_or_default(),
            reason: c.cancel_reason.clone().unwrap_or_default(),
            created: c.created_at.clone().unwrap_or_default(),
        }
    }
}

fn cancelled_id(c: &CancelledOrderSummary) -> String {
    c.order_id.clone().unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &MarketplaceClient,
    args: OrdersArgs,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OrdersCommand::List => {
            let orders = client.list_orders().await?;
            let out = output::render_list(
                session.output,
                &orders,
                |s| OrderRow::from(s),
                |s| s.order.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrdersCommand::Take { order_id } => {
            client.take_order(&order_id).await?;
            if !global.quiet {
                eprintln!("Order {order_id} taken");
            }
            Ok(())
        }

        OrdersCommand::Reject { order_id, reason } => {
            client.reject_order(&order_id, &reason).await?;
            if !global.quiet {
                eprintln!("Order {order_id} rejected");
            }
            Ok(())
        }

        OrdersCommand::Cancelled { url } => {
            let url = cancellations_url(url, session)?;
            let cancelled = client.list_cancelled_orders(&url).await?;
            let out = output::render_list(
                session.output,
                &cancelled,
                |c| CancelledRow::from(c),
                cancelled_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrdersCommand::Watch {
            interval,
            cancelled_url,
            once,
        } => {
            let opts = WatchOptions {
                interval: poll_interval(interval, session.poll_interval),
                cancelled_url: cancelled_url.or_else(|| session.profile.cancellations_url.clone()),
                once,
                format: session.output,
                color: output::should_color(global.color),
            };
            watch(client, &opts).await
        }
    }
}

fn cancellations_url(explicit: Option<String>, session: &Session) -> Result<String, CliError> {
    explicit
        .or_else(|| session.profile.cancellations_url.clone())
        .ok_or_else(|| CliError::MissingSetting {
            profile: session.profile_name.clone(),
            field: "cancellations_url",
            path: crate::config::config_path().display().to_string(),
        })
}

// ── Watch loop ──────────────────────────────────────────────────────

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// `--interval` if given, else the configured default, never below one second.
fn poll_interval(flag: Option<u64>, default: Duration) -> Duration {
    flag.map_or(default, Duration::from_secs)
        .max(MIN_POLL_INTERVAL)
}

struct WatchOptions {
    interval: Duration,
    cancelled_url: Option<String>,
    once: bool,
    format: OutputFormat,
    color: bool,
}

/// Ids already reported. Only ids still present in the latest listing are
/// remembered, so the sets stay as small as the marketplace's backlog.
#[derive(Debug, Default)]
struct Seen {
    orders: HashSet<String>,
    cancelled: HashSet<String>,
}

/// Keep the entries of `listing` whose id is new, and forget ids that
/// dropped out of the listing.
fn fresh<'a, T>(
    seen: &mut HashSet<String>,
    listing: &'a [T],
    id_fn: impl Fn(&T) -> String,
) -> Vec<&'a T> {
    let current: HashSet<String> = listing.iter().map(&id_fn).collect();
    seen.retain(|id| current.contains(id));
    listing
        .iter()
        .filter(|item| seen.insert(id_fn(item)))
        .collect()
}

async fn watch(client: &MarketplaceClient, opts: &WatchOptions) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval(opts.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seen = Seen::default();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    if !opts.once {
        eprintln!(
            "Watching for new orders every {}s. Press Ctrl-C to stop.",
            opts.interval.as_secs()
        );
    }

    loop {
        let cycle = async {
            ticker.tick().await;
            poll(client, opts, &mut seen).await
        };

        let result = tokio::select! {
            signal = &mut shutdown => {
                signal?;
                eprintln!("Stopped.");
                return Ok(());
            }
            result = cycle => result,
        };

        match result {
            Ok(()) => {}
            Err(err) if opts.once => return Err(err),
            Err(CliError::AuthFailed { message }) => {
                // The client already dropped the rejected credential.
                warn!("authentication failed ({message}); logging in again on the next poll");
            }
            Err(err @ (CliError::ConnectionFailed { .. } | CliError::InvalidResponse { .. })) => {
                warn!("poll failed: {err}");
            }
            Err(CliError::Api { status, .. }) if status == 429 || status >= 500 => {
                warn!("poll failed: HTTP {status}");
            }
            Err(err) => return Err(err),
        }

        if opts.once {
            return Ok(());
        }
    }
}

async fn poll(
    client: &MarketplaceClient,
    opts: &WatchOptions,
    seen: &mut Seen,
) -> Result<(), CliError> {
    let orders = client.list_orders().await?;
    let new_orders = fresh(&mut seen.orders, &orders, |s| s.order.id.clone());
    debug!(listed = orders.len(), new = new_orders.len(), "polled orders");
    for summary in new_orders {
        report(opts, summary, || describe_order(&summary.order, opts.color))?;
    }

    if let Some(url) = &opts.cancelled_url {
        let cancelled = client.list_cancelled_orders(url).await?;
        for c in fresh(&mut seen.cancelled, &cancelled, cancelled_id) {
            report(opts, c, || describe_cancellation(c, opts.color))?;
        }
    }
    Ok(())
}

/// Print one event: human text for table/plain, one document per event otherwise.
fn report<T: serde::Serialize>(
    opts: &WatchOptions,
    item: &T,
    human: impl FnOnce() -> String,
) -> Result<(), CliError> {
    let out = match opts.format {
        OutputFormat::Table | OutputFormat::Plain => human(),
        OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(item)?,
        OutputFormat::Yaml => format!("---\n{}", serde_yaml::to_string(item)?),
    };
    output::print_output(out.trim_end(), false);
    Ok(())
}

fn describe_order(order: &Order, color: bool) -> String {
    use std::fmt::Write;

    let header = format!("Order {}", order.id);
    let mut out = if color {
        header.green().bold().to_string()
    } else {
        header
    };
    for item in &order.items {
        let _ = write!(
            out,
            "\n  {} x {} ${}",
            item.name.as_deref().unwrap_or("?"),
            item.units,
            item.price.as_deref().unwrap_or("?")
        );
    }
    out
}

fn describe_cancellation(c: &CancelledOrderSummary, color: bool) -> String {
    let line = format!(
        "Cancelled order {} (store {}): {}",
        c.order_id.as_deref().unwrap_or("?"),
        c.store_id.as_deref().unwrap_or("?"),
        c.cancel_reason.as_deref().unwrap_or("no reason given")
    );
    if color {
        line.red().to_string()
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use rappi_api::marketplace::OrderItem;

    use super::*;

    #[test]
    fn fresh_reports_each_id_once_and_forgets_gone_ids() {
        let mut seen = HashSet::new();
        let first = ["a", "b"];
        let ids = |s: &&str| (*s).to_owned();

        assert_eq!(fresh(&mut seen, &first, ids), [&"a", &"b"]);
        assert!(fresh(&mut seen, &first, ids).is_empty());

        // "a" was taken elsewhere; "c" arrived.
        let second = ["b", "c"];
        assert_eq!(fresh(&mut seen, &second, ids), [&"c"]);
        assert!(!seen.contains("a"));
    }

    #[test]
    fn poll_interval_is_clamped_to_one_second() {
        let default = Duration::from_secs(5);
        assert_eq!(poll_interval(None, default), default);
        assert_eq!(poll_interval(Some(30), default), Duration::from_secs(30));
        assert_eq!(poll_interval(Some(0), default), MIN_POLL_INTERVAL);
        assert_eq!(poll_interval(None, Duration::ZERO), MIN_POLL_INTERVAL);
    }

    #[test]
    fn order_description_lists_items() {
        let order = Order {
            id: "42".into(),
            items: vec![OrderItem {
                name: Some("Burger".into()),
                units: 2,
                price: Some("12.50".into()),
                ..OrderItem::default()
            }],
            ..Order::default()
        };
        assert_eq!(describe_order(&order, false), "Order 42\n  Burger x 2 $12.50");
    }

    #[test]
    fn cancellation_description_falls_back() {
        let c = CancelledOrderSummary {
            order_id: Some("7".into()),
            ..CancelledOrderSummary::default()
        };
        assert_eq!(
            describe_cancellation(&c, false),
            "Cancelled order 7 (store ?): no reason given"
        );
    }
}
