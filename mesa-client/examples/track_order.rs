// mesa-client/examples/track_order.rs
// Customer journey example: place (or resume) an order and watch it progress

use mesa_client::{
    ClientConfig, OrderCreate, OrderItem, OrderSource, OrderStatus, StoreChange, SyncEngine,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <table_id> <customer_name> <customer_email>", args[0]);
        println!("  Example: {} t1 Ana ana@example.com", args[0]);
        println!("  Server comes from MESA_BASE_URL / MESA_EVENT_ADDR");
        return Ok(());
    }

    let table_id = &args[1];
    let name = &args[2];
    let email = &args[3];

    let engine = SyncEngine::new(ClientConfig::from_env());

    // Push is best effort; the poll loop covers us when the stream is down
    if let Err(e) = engine.connect_events().await {
        tracing::warn!("Event stream unavailable: {}", e);
    }

    // Resume the open order for this table + email, or place a new one
    let order = match engine.resume_order(table_id, email).await? {
        Some(order) => {
            tracing::info!("Resuming order {} ({})", order.id, order.status);
            order
        }
        None => {
            let table_name = std::env::var("MESA_TABLE_NAME")
                .unwrap_or_else(|_| format!("Table {}", table_id));
            let items = vec![
                OrderItem::new("m-paella", "Paella", 2, 14.5, vec![], None),
                OrderItem::new("m-agua", "Agua con gas", 1, 2.0, vec![], None),
            ];
            let payload = OrderCreate::new(
                table_id.as_str(),
                table_name,
                name.as_str(),
                Some(email.clone()),
                items,
                OrderSource::Customer,
            );
            let order = engine.place_order(payload).await?;
            tracing::info!("Order {} placed, total {:.2}", order.id, order.total_amount);
            order
        }
    };

    let _poll = engine.track_order(&order.id).await?;
    let mut changes = engine.subscribe();

    loop {
        match changes.recv().await {
            Ok(StoreChange::Order(o)) if o.id == order.id => {
                tracing::info!(
                    "Order {} is {} ({:.0}%)",
                    o.id,
                    o.status,
                    o.progress() * 100.0
                );
                if o.status == OrderStatus::Completed {
                    break;
                }
            }
            Ok(StoreChange::OrdersEvicted(ids)) if ids.contains(&order.id) => {
                tracing::warn!("Order {} is gone from the server", order.id);
                break;
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Change stream lagged by {}", n);
            }
            Err(_) => break,
        }
    }

    Ok(())
}
