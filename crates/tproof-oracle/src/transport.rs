//! Transport abstraction between the url-verifier router and the oracle.
//!
//! Implementations may use HTTP, a message queue, or anything else that
//! delivers [`OracleMessage`]s between principals.

use std::time::Duration;

use async_trait::async_trait;

use tproof_core::Principal;

use crate::error::Result;
use crate::messages::OracleMessage;

/// Transport for oracle messages.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OracleTransport: Send + Sync {
    /// Send a message to a specific principal.
    async fn send(&self, to: &Principal, message: OracleMessage) -> Result<()>;

    /// Receive the next message and its sender.
    async fn recv(&self) -> Result<(Principal, OracleMessage)>;

    /// Receive with timeout. `None` if nothing arrived in time.
    async fn recv_timeout(&self, timeout: Duration) -> Result<Option<(Principal, OracleMessage)>>;

    /// The principal this transport speaks for.
    fn local_principal(&self) -> Principal;
}

/// An in-memory transport for tests and single-process deployments.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};

    use crate::error::OracleError;

    const CHANNEL_CAPACITY: usize = 1000;

    #[derive(Debug)]
    struct Envelope {
        from: Principal,
        message: OracleMessage,
    }

    /// Shared routing table of connected principals.
    #[derive(Default)]
    pub struct MemoryNetwork {
        senders: RwLock<HashMap<Principal, mpsc::Sender<Envelope>>>,
    }

    impl MemoryNetwork {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Connect `principal` to this network.
        pub async fn connect(self: &Arc<Self>, principal: Principal) -> MemoryTransport {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            self.senders.write().await.insert(principal, tx);

            MemoryTransport {
                principal,
                network: Arc::clone(self),
                receiver: RwLock::new(rx),
            }
        }

        /// Disconnect `principal`. Later sends to it fail.
        pub async fn disconnect(&self, principal: &Principal) {
            self.senders.write().await.remove(principal);
        }
    }

    /// In-memory transport endpoint.
    pub struct MemoryTransport {
        principal: Principal,
        network: Arc<MemoryNetwork>,
        receiver: RwLock<mpsc::Receiver<Envelope>>,
    }

    #[async_trait]
    impl OracleTransport for MemoryTransport {
        async fn send(&self, to: &Principal, message: OracleMessage) -> Result<()> {
            let senders = self.network.senders.read().await;
            let sender = senders
                .get(to)
                .ok_or_else(|| OracleError::TransportError(format!("{to} not connected")))?;
            sender
                .send(Envelope {
                    from: self.principal,
                    message,
                })
                .await
                .map_err(|_| OracleError::TransportError("peer disconnected".into()))
        }

        async fn recv(&self) -> Result<(Principal, OracleMessage)> {
            let mut rx = self.receiver.write().await;
            match rx.recv().await {
                Some(envelope) => Ok((envelope.from, envelope.message)),
                None => Err(OracleError::TransportError("channel closed".into())),
            }
        }

        async fn recv_timeout(&self, timeout: Duration) -> Result<Option<(Principal, OracleMessage)>> {
            let mut rx = self.receiver.write().await;
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(envelope)) => Ok(Some((envelope.from, envelope.message))),
                Ok(None) => Err(OracleError::TransportError("channel closed".into())),
                Err(_) => Ok(None),
            }
        }

        fn local_principal(&self) -> Principal {
            self.principal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryNetwork;
    use super::*;
    use crate::error::OracleError;
    use crate::messages::{Fulfilment, RequestId};
    use tproof_core::{ContentHash, Signature};

    fn fulfil() -> OracleMessage {
        OracleMessage::Fulfil {
            fulfilment: Fulfilment {
                request_id: RequestId([1; 32]),
                hash: ContentHash::ZERO,
                matched: true,
            },
            signature: Signature::ZERO,
        }
    }

    #[tokio::test]
    async fn test_memory_transport_send_recv() {
        let network = MemoryNetwork::new();
        let a = Principal::from_bytes([0xAA; 32]);
        let b = Principal::from_bytes([0xBB; 32]);

        let transport_a = network.connect(a).await;
        let transport_b = network.connect(b).await;

        transport_a.send(&b, fulfil()).await.unwrap();

        let (from, received) = transport_b.recv().await.unwrap();
        assert_eq!(from, a);
        assert!(matches!(received, OracleMessage::Fulfil { .. }));
        assert_eq!(transport_b.local_principal(), b);
    }

    #[tokio::test]
    async fn test_memory_transport_timeout() {
        let network = MemoryNetwork::new();
        let a = network.connect(Principal::from_bytes([0xAA; 32])).await;

        let got = a.recv_timeout(Duration::from_millis(10)).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_memory_transport_unknown_peer() {
        let network = MemoryNetwork::new();
        let a = network.connect(Principal::from_bytes([0xAA; 32])).await;
        let b = Principal::from_bytes([0xBB; 32]);

        let err = a.send(&b, fulfil()).await.unwrap_err();
        assert!(matches!(err, OracleError::TransportError(_)));

        let _endpoint_b = network.connect(b).await;
        a.send(&b, fulfil()).await.unwrap();

        network.disconnect(&b).await;
        assert!(a.send(&b, fulfil()).await.is_err());
    }
}
