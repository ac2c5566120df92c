use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::transport::{EventTransport, MemoryEventTransport, TcpEventTransport};
use super::EventError;
use shared::{EventFrame, PushEvent};

/// Event Client
///
/// Maintains one connection to the server's push stream. A background task
/// reads frames, decodes them and fans the events out to every subscriber.
/// Unknown event names are skipped so old clients survive new servers.
#[derive(Debug)]
pub struct EventClient {
    transport: ClientTransport,
    event_tx: broadcast::Sender<PushEvent>,
    read_task: JoinHandle<()>,
}

#[derive(Debug, Clone)]
enum ClientTransport {
    Tcp(TcpEventTransport),
    Memory(MemoryEventTransport),
}

impl ClientTransport {
    async fn read_frame(&self) -> Result<EventFrame, EventError> {
        match self {
            ClientTransport::Tcp(t) => t.read_frame().await,
            ClientTransport::Memory(t) => t.read_frame().await,
        }
    }

    async fn write_frame(&self, frame: &EventFrame) -> Result<(), EventError> {
        match self {
            ClientTransport::Tcp(t) => t.write_frame(frame).await,
            ClientTransport::Memory(t) => t.write_frame(frame).await,
        }
    }

    async fn close(&self) -> Result<(), EventError> {
        match self {
            ClientTransport::Tcp(t) => t.close().await,
            ClientTransport::Memory(t) => t.close().await,
        }
    }
}

impl EventClient {
    /// Connect via TCP and authenticate with the given bearer token
    pub async fn connect(addr: &str, token: &str) -> Result<Self, EventError> {
        let transport = ClientTransport::Tcp(TcpEventTransport::connect(addr).await?);
        transport.write_frame(&EventFrame::auth(token)).await?;
        Ok(Self::new(transport))
    }

    /// Create an in-memory client (for in-process servers and tests)
    pub async fn memory(
        server_broadcast_tx: &broadcast::Sender<EventFrame>,
        client_to_server_tx: &broadcast::Sender<EventFrame>,
        token: &str,
    ) -> Result<Self, EventError> {
        let transport =
            ClientTransport::Memory(MemoryEventTransport::new(server_broadcast_tx, client_to_server_tx));
        transport.write_frame(&EventFrame::auth(token)).await?;
        Ok(Self::new(transport))
    }

    fn new(transport: ClientTransport) -> Self {
        let (event_tx, _) = broadcast::channel(1024);

        let reader = transport.clone();
        let tx = event_tx.clone();
        let read_task = tokio::spawn(async move {
            loop {
                match reader.read_frame().await {
                    Ok(frame) => match PushEvent::try_from(frame) {
                        Ok(event) => {
                            if let Err(e) = tx.send(event) {
                                tracing::debug!("No subscribers for event: {}", e);
                            }
                        }
                        Err(shared::event::EventDecodeError::UnknownEvent(name)) => {
                            tracing::debug!(event = %name, "Skipping unknown event");
                        }
                        Err(e) => {
                            tracing::warn!("Malformed event payload: {}", e);
                        }
                    },
                    Err(e) => {
                        tracing::error!("Event stream read error: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            transport,
            event_tx,
            read_task,
        }
    }

    /// Subscribe to decoded push events
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.event_tx.subscribe()
    }

    /// Close the connection and stop the read task
    pub async fn close(&self) -> Result<(), EventError> {
        self.read_task.abort();
        self.transport.close().await
    }
}

impl Drop for EventClient {
    fn drop(&mut self) {
        self.read_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::event::{AUTH, ORDER_NEW};
    use shared::models::{Order, OrderSource, OrderStatus};

    fn sample_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            table_id: "t1".to_string(),
            table_name: "Mesa 1".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: None,
            customer_id: None,
            items: vec![],
            status: OrderStatus::Pending,
            queue_position: None,
            total_amount: 12.5,
            order_source: OrderSource::Customer,
            claimed_by: None,
            claimed_at: None,
            created_at: chrono::Utc::now(),
            confirmed_at: None,
            ready_at: None,
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn decodes_and_fans_out_events() {
        let (server_tx, _) = broadcast::channel(16);
        let (client_tx, mut at_server) = broadcast::channel(16);

        let client = EventClient::memory(&server_tx, &client_tx, "tok")
            .await
            .unwrap();

        // The client authenticates first
        let auth = at_server.recv().await.unwrap();
        assert_eq!(auth.event, AUTH);
        assert_eq!(auth.data["token"], "tok");

        let mut events = client.subscribe();
        let frame = EventFrame::new(ORDER_NEW, &sample_order("o9")).unwrap();
        server_tx.send(frame).unwrap();

        match events.recv().await.unwrap() {
            PushEvent::OrderNew(order) => assert_eq!(order.id, "o9"),
            other => panic!("expected OrderNew, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_events_are_skipped() {
        let (server_tx, _) = broadcast::channel(16);
        let (client_tx, _keep) = broadcast::channel(16);

        let client = EventClient::memory(&server_tx, &client_tx, "tok")
            .await
            .unwrap();
        let mut events = client.subscribe();

        // An event name this client does not know, then one it does
        let unknown = EventFrame::new("menu:updated", &serde_json::json!({"id": "m1"})).unwrap();
        server_tx.send(unknown).unwrap();
        let known = EventFrame::new(ORDER_NEW, &sample_order("o1")).unwrap();
        server_tx.send(known).unwrap();

        match events.recv().await.unwrap() {
            PushEvent::OrderNew(order) => assert_eq!(order.id, "o1"),
            other => panic!("expected OrderNew, got {other:?}"),
        }
    }
}
