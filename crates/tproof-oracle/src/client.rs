//! The url-verifier router.
//!
//! Forwards queued verification requests to the oracle and turns signed
//! fulfilments into registry resolutions.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tproof_core::{CallContext, ContentHash, Principal, Signature, Timestamp};
use tproof_registry::{HashRegistry, VerificationOutcome, VerificationRequest, VerificationStatus};

use crate::error::{OracleError, Result};
use crate::messages::{Fulfilment, OracleMessage, OracleRequest, RequestId};
use crate::transport::OracleTransport;

/// Configuration for the url-verifier router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// The oracle's Ed25519 public key. Fulfilments must be signed by it.
    pub oracle_key: Principal,
    /// Job the oracle runs for each request.
    pub job_id: String,
    /// How long a relay waits for one oracle message.
    pub response_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            oracle_key: Principal::ZERO,
            job_id: "tproof-url-verification".into(),
            response_timeout: Duration::from_secs(30),
        }
    }
}

/// A request the oracle has not answered yet.
///
/// `requested_at` ties the request to the opening of the record it asked
/// about; a reopened record no longer accepts its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct InFlight {
    hash: ContentHash,
    requested_at: Timestamp,
}

/// Client side of the oracle protocol, and holder of the url-verifier role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlVerifierRouter {
    principal: Principal,
    config: OracleConfig,
    in_flight: BTreeMap<RequestId, InFlight>,
}

impl UrlVerifierRouter {
    pub fn new(principal: Principal, config: OracleConfig) -> Self {
        Self {
            principal,
            config,
            in_flight: BTreeMap::new(),
        }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Number of unanswered requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, id: &RequestId) -> bool {
        self.in_flight.contains_key(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outbound
    // ─────────────────────────────────────────────────────────────────────────

    /// Forward a queued verification request to the oracle.
    pub async fn dispatch<T: OracleTransport + ?Sized>(
        &mut self,
        request: VerificationRequest,
        transport: &T,
    ) -> Result<RequestId> {
        if request.verifier != self.principal {
            return Err(OracleError::Misaddressed {
                expected: request.verifier,
                actual: self.principal,
            });
        }

        let request = OracleRequest::new(self.config.job_id.clone(), request);
        request
            .validate_limits()
            .map_err(|e| OracleError::InvalidMessage(e.into()))?;
        let id = request.id()?;
        let in_flight = InFlight {
            hash: request.hash,
            requested_at: request.requested_at,
        };

        transport
            .send(&self.config.oracle_key, OracleMessage::Request { id, request })
            .await?;
        self.in_flight.insert(id, in_flight);

        debug!(request = %id, "verification request dispatched");
        Ok(id)
    }

    /// Forget requests the registry can no longer accept an answer for:
    /// their record expired, was resolved, or was reopened by a later request.
    ///
    /// Expiry is read from the registry, so an extended verification keeps
    /// its request. Returns how many were dropped.
    pub fn prune_expired(&mut self, registry: &HashRegistry, now: Timestamp) -> usize {
        let before = self.in_flight.len();
        self.in_flight.retain(|_, entry| {
            registry
                .verification(&entry.hash)
                .is_some_and(|v| v.requested_at == entry.requested_at && v.is_open(now))
        });
        let dropped = before - self.in_flight.len();
        if dropped > 0 {
            debug!(dropped, "expired requests pruned");
        }
        dropped
    }

    /// Forget every request about `hash`, once its record was resolved
    /// another way. Returns how many were dropped.
    pub fn retire_requests_for(&mut self, hash: &ContentHash) -> usize {
        let before = self.in_flight.len();
        self.in_flight.retain(|_, entry| entry.hash != *hash);
        before - self.in_flight.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inbound
    // ─────────────────────────────────────────────────────────────────────────

    /// Check a fulfilment against the in-flight table and the oracle key.
    pub fn authenticate(&self, fulfilment: &Fulfilment, signature: &Signature) -> Result<()> {
        let entry = self
            .in_flight
            .get(&fulfilment.request_id)
            .ok_or(OracleError::UnknownRequest(fulfilment.request_id))?;

        self.config
            .oracle_key
            .verify(&fulfilment.canonical_bytes()?, signature)
            .map_err(|_| OracleError::BadSignature)?;

        if entry.hash != fulfilment.hash {
            return Err(OracleError::InvalidMessage(format!(
                "fulfilment for {} answers {}",
                entry.hash, fulfilment.hash
            )));
        }
        Ok(())
    }

    /// Resolve the registry record a signed fulfilment answers.
    ///
    /// Unknown requests and bad signatures leave the request in flight and
    /// the record untouched. Once authenticated, the request is retired
    /// whatever the registry says.
    pub fn fulfil(
        &mut self,
        message: OracleMessage,
        registry: &mut HashRegistry,
        now: Timestamp,
    ) -> Result<VerificationStatus> {
        let OracleMessage::Fulfil {
            fulfilment,
            signature,
        } = message
        else {
            return Err(OracleError::InvalidMessage("expected a fulfilment".into()));
        };

        if let Err(e) = self.authenticate(&fulfilment, &signature) {
            warn!(request = %fulfilment.request_id, error = %e, "fulfilment rejected");
            return Err(e);
        }
        let entry = self
            .in_flight
            .remove(&fulfilment.request_id)
            .ok_or(OracleError::UnknownRequest(fulfilment.request_id))?;

        let ctx = CallContext::new(self.principal, now);
        let outcome = VerificationOutcome::from(fulfilment.matched);
        let status =
            registry.resolve_verification(&ctx, &fulfilment.hash, entry.requested_at, outcome)?;

        info!(
            request = %fulfilment.request_id,
            hash = %fulfilment.hash,
            ?status,
            "verification fulfilled"
        );
        Ok(status)
    }
}
