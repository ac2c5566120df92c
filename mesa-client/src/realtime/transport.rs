use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast};

use super::EventError;
use shared::EventFrame;

/// Transport abstraction for the event stream
#[async_trait]
pub trait EventTransport: Send + Sync + std::fmt::Debug {
    async fn read_frame(&self) -> Result<EventFrame, EventError>;
    async fn write_frame(&self, frame: &EventFrame) -> Result<(), EventError>;
    async fn close(&self) -> Result<(), EventError>;
}

/// TCP transport
///
/// Wire format per frame: payload length (4 bytes, little endian) followed
/// by the JSON-encoded [`EventFrame`].
#[derive(Debug, Clone)]
pub struct TcpEventTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpEventTransport {
    pub async fn connect(addr: &str) -> Result<Self, EventError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| EventError::Connection(e.to_string()))?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        })
    }
}

#[async_trait]
impl EventTransport for TcpEventTransport {
    async fn read_frame(&self) -> Result<EventFrame, EventError> {
        let mut reader = self.reader.lock().await;

        // Read payload length (4 bytes)
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await.map_err(EventError::Io)?;
        let len = u32::from_le_bytes(len_buf) as usize;

        // Read payload
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await.map_err(EventError::Io)?;

        serde_json::from_slice(&payload).map_err(EventError::InvalidFrame)
    }

    async fn write_frame(&self, frame: &EventFrame) -> Result<(), EventError> {
        let payload = serde_json::to_vec(frame).map_err(EventError::InvalidFrame)?;

        let mut data = Vec::with_capacity(4 + payload.len());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&payload);

        let mut writer = self.writer.lock().await;
        writer.write_all(&data).await.map_err(EventError::Io)?;
        Ok(())
    }

    async fn close(&self) -> Result<(), EventError> {
        // Dropping the Arc references will eventually close the stream
        Ok(())
    }
}

/// Memory transport (for in-process communication)
#[derive(Debug, Clone)]
pub struct MemoryEventTransport {
    /// Receiver for frames FROM the server
    rx: Arc<Mutex<broadcast::Receiver<EventFrame>>>,
    /// Sender for frames TO the server
    tx: broadcast::Sender<EventFrame>,
}

impl MemoryEventTransport {
    /// Create a new memory transport
    ///
    /// # Arguments
    /// * `server_broadcast_tx` - The server's broadcast sender (to subscribe to pushes)
    /// * `client_to_server_tx` - The channel to send frames TO the server
    pub fn new(
        server_broadcast_tx: &broadcast::Sender<EventFrame>,
        client_to_server_tx: &broadcast::Sender<EventFrame>,
    ) -> Self {
        Self {
            rx: Arc::new(Mutex::new(server_broadcast_tx.subscribe())),
            tx: client_to_server_tx.clone(),
        }
    }
}

#[async_trait]
impl EventTransport for MemoryEventTransport {
    async fn read_frame(&self) -> Result<EventFrame, EventError> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .map_err(|e| EventError::Connection(format!("Memory channel error: {}", e)))
    }

    async fn write_frame(&self, frame: &EventFrame) -> Result<(), EventError> {
        self.tx
            .send(frame.clone())
            .map_err(|e| EventError::Connection(format!("Failed to send to server: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), EventError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Order, OrderSource, OrderStatus};

    fn sample_order() -> Order {
        Order {
            id: "o1".to_string(),
            table_id: "t1".to_string(),
            table_name: "Mesa 1".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: Some("ana@example.com".to_string()),
            customer_id: None,
            items: vec![],
            status: OrderStatus::Pending,
            queue_position: None,
            total_amount: 0.0,
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
    async fn tcp_framing_roundtrip() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();
            let transport = TcpEventTransport {
                reader: Arc::new(Mutex::new(reader)),
                writer: Arc::new(Mutex::new(writer)),
            };
            let frame = transport.read_frame().await.unwrap();
            // Echo it back
            transport.write_frame(&frame).await.unwrap();
        });

        let client = TcpEventTransport::connect(&addr).await.unwrap();
        let frame = EventFrame::new(shared::event::ORDER_NEW, &sample_order()).unwrap();
        client.write_frame(&frame).await.unwrap();

        let echoed = client.read_frame().await.unwrap();
        assert_eq!(echoed.event, shared::event::ORDER_NEW);
        assert_eq!(echoed.data["id"], "o1");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn memory_transport_receives_broadcasts() {
        let (server_tx, _) = broadcast::channel(16);
        let (client_tx, mut server_rx) = broadcast::channel(16);

        let transport = MemoryEventTransport::new(&server_tx, &client_tx);

        let frame = EventFrame::new(shared::event::ORDER_UPDATED, &sample_order()).unwrap();
        server_tx.send(frame).unwrap();

        let received = transport.read_frame().await.unwrap();
        assert_eq!(received.event, shared::event::ORDER_UPDATED);

        let auth = EventFrame::auth("tok");
        transport.write_frame(&auth).await.unwrap();
        let at_server = server_rx.recv().await.unwrap();
        assert_eq!(at_server.event, shared::event::AUTH);
    }
}
