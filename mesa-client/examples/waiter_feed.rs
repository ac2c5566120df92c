// mesa-client/examples/waiter_feed.rs
// Waiter task feed example: sign in, keep the feed synced, print it on change

use mesa_client::{ClientConfig, PollScope, StoreChange, SyncEngine, TaskFeed, TaskKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <email> <password>", args[0]);
        println!("  Example: {} marta@mesa.test password123", args[0]);
        println!("  Server comes from MESA_BASE_URL / MESA_EVENT_ADDR");
        return Ok(());
    }

    let email = &args[1];
    let password = &args[2];

    let engine = SyncEngine::new(ClientConfig::from_env());

    let user = match engine.sign_in(email, password).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to sign in: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Signed in as: {} ({:?})", user.name, user.role);

    // Load once up front, then keep syncing in the background
    engine.refresh(&PollScope::WaiterTasks).await?;
    let _poll = engine.start_polling(PollScope::WaiterTasks);

    let feed = engine.task_feed(user.id.clone());
    let mut changes = engine.subscribe();

    print_feed(&feed);
    loop {
        match changes.recv().await {
            Ok(StoreChange::Order(_))
            | Ok(StoreChange::Call(_))
            | Ok(StoreChange::OrdersEvicted(_))
            | Ok(StoreChange::CallsEvicted(_)) => print_feed(&feed),
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Feed lagged by {} changes", n);
            }
            Err(_) => break,
        }
    }

    Ok(())
}

fn print_feed(feed: &TaskFeed) {
    let tasks = feed.visible();
    println!("---- {} open task(s) ----", tasks.len());
    for task in &tasks {
        let kind = match task.kind {
            TaskKind::Order => "order",
            TaskKind::Call(_) => "call",
        };
        let holder = task.claimed_by.as_deref().unwrap_or("-");
        println!(
            "  [{}] {} | {} | {} | claimed by: {}",
            kind, task.table_name, task.customer_name, task.message, holder
        );
    }
}
