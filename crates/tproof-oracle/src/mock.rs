//! A scripted oracle for tests and local deployments.

use std::collections::BTreeMap;

use tracing::debug;

use tproof_core::{ContentHash, Keypair, Principal};

use crate::error::{OracleError, Result};
use crate::messages::{Fulfilment, OracleMessage, OracleRequest, RequestId};
use crate::transport::OracleTransport;

/// Answers every request with a configurable verdict and a real signature.
///
/// Verdicts default to "matched" unless overridden per hash.
#[derive(Debug, Clone)]
pub struct MockOracle {
    keypair: Keypair,
    default_verdict: bool,
    verdicts: BTreeMap<ContentHash, bool>,
}

impl MockOracle {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair,
            default_verdict: true,
            verdicts: BTreeMap::new(),
        }
    }

    /// The key fulfilments are signed with.
    pub fn principal(&self) -> Principal {
        self.keypair.principal()
    }

    pub fn set_default_verdict(&mut self, matched: bool) {
        self.default_verdict = matched;
    }

    pub fn set_verdict(&mut self, hash: ContentHash, matched: bool) {
        self.verdicts.insert(hash, matched);
    }

    /// Sign a fulfilment.
    pub fn sign(&self, fulfilment: Fulfilment) -> OracleMessage {
        // Encoding three fixed fields cannot fail.
        let bytes = fulfilment.canonical_bytes().unwrap_or_default();
        OracleMessage::Fulfil {
            fulfilment,
            signature: self.keypair.sign(&bytes),
        }
    }

    /// The signed answer to a request.
    pub fn answer(&self, id: RequestId, request: &OracleRequest) -> OracleMessage {
        let matched = self
            .verdicts
            .get(&request.hash)
            .copied()
            .unwrap_or(self.default_verdict);
        self.sign(Fulfilment {
            request_id: id,
            hash: request.hash,
            matched,
        })
    }

    /// Receive one request and send its answer back to the sender.
    pub async fn serve_one<T: OracleTransport + ?Sized>(&self, transport: &T) -> Result<RequestId> {
        let (from, message) = transport.recv().await?;
        let OracleMessage::Request { id, request } = message else {
            return Err(OracleError::InvalidMessage("expected a request".into()));
        };
        if request.id()? != id {
            return Err(OracleError::InvalidMessage(format!("request id {id} does not match")));
        }

        debug!(request = %id, hash = %request.hash, "oracle answering");
        transport.send(&from, self.answer(id, &request)).await?;
        Ok(id)
    }
}
