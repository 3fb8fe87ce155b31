//! The hash registry.
//!
//! Each mutating entry point has a `check_*` twin that runs every check
//! without mutating, so an orchestrator can validate a whole batch first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tproof_access::{
    AccessControl, PauseState, CERTIFICATION_MANAGER_ROLE, DEFAULT_ADMIN_ROLE, PAUSER_ROLE,
    STORAGE_ADMIN_ROLE, URL_VERIFIER_ROUTER_ROLE,
};
use tproof_core::{CallContext, ContentHash, ContractError, Principal, Result, Timestamp, TokenId};

use crate::storage::StorageTypeDescriptor;
use crate::verification::{
    deadline, VerificationOutcome, VerificationRecord, VerificationRequest, VerificationStatus,
};

/// Everything the registry knows about one hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    /// Certificates that certified this hash, in the order recorded.
    pub token_ids: Vec<TokenId>,
    pub first_certified_at: Option<Timestamp>,
    /// The current (latest) verification.
    pub verification: Option<VerificationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRegistry {
    principal: Principal,
    storage_types: BTreeMap<String, StorageTypeDescriptor>,
    records: BTreeMap<ContentHash, HashRecord>,
    url_verifier_router: Option<Principal>,
    outbox: Vec<VerificationRequest>,
    access: AccessControl,
    paused: PauseState,
}

impl HashRegistry {
    /// Create a registry. `admin` receives the default admin, pauser and
    /// storage admin roles.
    pub fn new(principal: Principal, admin: Principal) -> Self {
        let mut access = AccessControl::new(admin);
        access.setup_role(PAUSER_ROLE, admin);
        access.setup_role(STORAGE_ADMIN_ROLE, admin);

        Self {
            principal,
            storage_types: BTreeMap::new(),
            records: BTreeMap::new(),
            url_verifier_router: None,
            outbox: Vec::new(),
            access,
            paused: PauseState::default(),
        }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `handler` under `name`, replacing any previous handler.
    ///
    /// Returns the replaced handler.
    pub fn register_storage_type(
        &mut self,
        ctx: &CallContext,
        name: &str,
        handler: Principal,
    ) -> Result<Option<Principal>> {
        self.access.check_role(STORAGE_ADMIN_ROLE, &ctx.caller)?;
        if name.is_empty() {
            return Err(ContractError::InvalidState("storage type name must not be empty".into()));
        }

        let previous = self.storage_types.insert(
            name.to_owned(),
            StorageTypeDescriptor {
                name: name.to_owned(),
                handler,
                registered_at: ctx.now,
            },
        );
        match &previous {
            Some(old) => warn!(name, old = %old.handler, new = %handler, "storage type replaced"),
            None => info!(name, handler = %handler, "storage type registered"),
        }
        Ok(previous.map(|old| old.handler))
    }

    /// Address verification requests to `router`, and make it the sole
    /// holder of the url-verifier role among configured routers.
    pub fn set_url_verifier_router(
        &mut self,
        ctx: &CallContext,
        router: Principal,
    ) -> Result<Option<Principal>> {
        self.access.check_role(DEFAULT_ADMIN_ROLE, &ctx.caller)?;

        let previous = self.url_verifier_router.replace(router);
        if let Some(old) = previous {
            self.access.remove_role(URL_VERIFIER_ROUTER_ROLE, &old);
        }
        self.access.setup_role(URL_VERIFIER_ROUTER_ROLE, router);
        info!(router = %router, "url verifier router set");
        Ok(previous)
    }

    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        self.paused.pause(&self.access, &ctx.caller)
    }

    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        self.paused.unpause(&self.access, &ctx.caller)
    }

    pub fn grant_role(&mut self, ctx: &CallContext, role: &str, account: Principal) -> Result<bool> {
        self.access.grant_role(&ctx.caller, role, account)
    }

    pub fn revoke_role(&mut self, ctx: &CallContext, role: &str, account: &Principal) -> Result<bool> {
        self.access.revoke_role(&ctx.caller, role, account)
    }

    pub fn renounce_role(&mut self, ctx: &CallContext, role: &str) -> bool {
        self.access.renounce_role(&ctx.caller, role)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certification
    // ─────────────────────────────────────────────────────────────────────────

    pub fn check_record_certification(&self, ctx: &CallContext) -> Result<()> {
        self.access.check_role(CERTIFICATION_MANAGER_ROLE, &ctx.caller)
    }

    /// Record that certificate `id` certified `hash`.
    pub fn record_certification(&mut self, ctx: &CallContext, hash: ContentHash, id: TokenId) -> Result<()> {
        self.check_record_certification(ctx)?;

        let record = self.records.entry(hash).or_default();
        record.first_certified_at.get_or_insert(ctx.now);
        record.token_ids.push(id);
        debug!(hash = %hash, id = %id, "certification recorded");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Run every check of [`HashRegistry::open_verification`].
    pub fn check_open_verification(
        &self,
        ctx: &CallContext,
        hash: &ContentHash,
        storage_type: &str,
    ) -> Result<()> {
        self.access.check_role(CERTIFICATION_MANAGER_ROLE, &ctx.caller)?;
        self.paused.require_not_paused()?;
        if self.url_verifier_router.is_none() {
            return Err(ContractError::Uninitialized("url verifier router"));
        }
        if !self.storage_types.contains_key(storage_type) {
            return Err(ContractError::NotFound(format!("storage type {storage_type:?}")));
        }
        if self.verification(hash).is_some_and(|v| v.is_open(ctx.now)) {
            return Err(ContractError::InvalidState(format!(
                "verification of {hash} is still pending"
            )));
        }
        Ok(())
    }

    /// Open a Pending verification of `hash` against `url`, expiring
    /// `validity_secs` from now, and queue a request for the oracle.
    ///
    /// An empty `url` leaves locating the content to the storage type's
    /// handler. Replaces a previous record that is resolved or expired.
    pub fn open_verification(
        &mut self,
        ctx: &CallContext,
        hash: ContentHash,
        url: &str,
        storage_type: &str,
        validity_secs: u64,
    ) -> Result<()> {
        self.check_open_verification(ctx, &hash, storage_type)?;
        let (Some(verifier), Some(descriptor)) =
            (self.url_verifier_router, self.storage_types.get(storage_type))
        else {
            return Err(ContractError::Uninitialized("url verifier router"));
        };

        let expires_at = deadline(ctx.now, validity_secs);
        let request = VerificationRequest {
            hash,
            url: url.to_owned(),
            storage_type: storage_type.to_owned(),
            handler: descriptor.handler,
            requested_at: ctx.now,
            expires_at,
            verifier,
        };

        self.records.entry(hash).or_default().verification = Some(VerificationRecord {
            hash,
            url: url.to_owned(),
            storage_type: storage_type.to_owned(),
            requested_at: ctx.now,
            expires_at,
            status: VerificationStatus::Pending,
        });
        self.outbox.push(request);

        info!(hash = %hash, url, storage_type, expires_at, "verification opened");
        Ok(())
    }

    /// Record the oracle's verdict on a Pending, unexpired verification.
    ///
    /// `requested_at` names the opening the verdict answers. A record that
    /// was reopened since then refuses it.
    pub fn resolve_verification(
        &mut self,
        ctx: &CallContext,
        hash: &ContentHash,
        requested_at: Timestamp,
        outcome: VerificationOutcome,
    ) -> Result<VerificationStatus> {
        self.access.check_role(URL_VERIFIER_ROUTER_ROLE, &ctx.caller)?;
        self.paused.require_not_paused()?;

        let record = self
            .records
            .get_mut(hash)
            .and_then(|r| r.verification.as_mut())
            .ok_or_else(|| ContractError::NotFound(format!("verification of {hash}")))?;
        if record.requested_at != requested_at {
            return Err(ContractError::InvalidState(format!(
                "verification of {hash} was reopened at {}",
                record.requested_at
            )));
        }
        match record.status_at(ctx.now) {
            VerificationStatus::Pending => {}
            VerificationStatus::Expired => {
                return Err(ContractError::InvalidState(format!("verification of {hash} expired")))
            }
            status => {
                return Err(ContractError::InvalidState(format!(
                    "verification of {hash} already {status:?}"
                )))
            }
        }

        record.status = outcome.into();
        info!(hash = %hash, ?outcome, "verification resolved");
        Ok(record.status)
    }

    /// Run every check of [`HashRegistry::extend_verification`].
    pub fn check_extend_verification(&self, ctx: &CallContext, hash: &ContentHash) -> Result<()> {
        self.access.check_role(CERTIFICATION_MANAGER_ROLE, &ctx.caller)?;
        self.paused.require_not_paused()?;

        let record = self
            .verification(hash)
            .ok_or_else(|| ContractError::NotFound(format!("verification of {hash}")))?;
        match record.status_at(ctx.now) {
            VerificationStatus::Pending => Ok(()),
            VerificationStatus::Expired => Err(ContractError::InvalidState(format!(
                "verification of {hash} expired; open a new one"
            ))),
            status => Err(ContractError::InvalidState(format!(
                "verification of {hash} is {status:?}, not pending"
            ))),
        }
    }

    /// Push the expiry of a Pending verification `extra_secs` later.
    ///
    /// Returns the new expiry.
    pub fn extend_verification(
        &mut self,
        ctx: &CallContext,
        hash: &ContentHash,
        extra_secs: u64,
    ) -> Result<Timestamp> {
        self.check_extend_verification(ctx, hash)?;
        let record = self
            .records
            .get_mut(hash)
            .and_then(|r| r.verification.as_mut())
            .ok_or_else(|| ContractError::NotFound(format!("verification of {hash}")))?;

        record.expires_at = deadline(record.expires_at, extra_secs);
        debug!(hash = %hash, expires_at = record.expires_at, "verification extended");
        Ok(record.expires_at)
    }

    /// Hand queued verification requests to the caller.
    pub fn drain_requests(&mut self) -> Vec<VerificationRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Drop the first `count` queued requests once they have been delivered.
    pub fn acknowledge_requests(&mut self, count: usize) {
        let count = count.min(self.outbox.len());
        self.outbox.drain(..count);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn storage_type(&self, name: &str) -> Option<&StorageTypeDescriptor> {
        self.storage_types.get(name)
    }

    /// Registered storage types, by name.
    pub fn storage_types(&self) -> impl Iterator<Item = &StorageTypeDescriptor> {
        self.storage_types.values()
    }

    pub fn url_verifier_router(&self) -> Option<Principal> {
        self.url_verifier_router
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_paused()
    }

    pub fn record(&self, hash: &ContentHash) -> Option<&HashRecord> {
        self.records.get(hash)
    }

    pub fn certifications(&self, hash: &ContentHash) -> &[TokenId] {
        self.records
            .get(hash)
            .map(|r| r.token_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn verification(&self, hash: &ContentHash) -> Option<&VerificationRecord> {
        self.records.get(hash).and_then(|r| r.verification.as_ref())
    }

    /// Observable verification status of `hash` at `now`.
    pub fn verification_status(&self, hash: &ContentHash, now: Timestamp) -> Option<VerificationStatus> {
        self.verification(hash).map(|v| v.status_at(now))
    }

    /// Requests queued and not yet drained.
    pub fn pending_requests(&self) -> &[VerificationRequest] {
        &self.outbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tproof_core::ErrorKind;

    const DAY: u64 = 86_400;
    const T0: Timestamp = 1_700_000_000;

    struct Setup {
        registry: HashRegistry,
        admin: CallContext,
        manager: CallContext,
        verifier: CallContext,
    }

    fn principal(b: u8) -> Principal {
        Principal::from_bytes([b; 32])
    }

    fn setup() -> Setup {
        let admin = CallContext::new(principal(1), T0);
        let manager = CallContext::new(principal(2), T0);
        let verifier = CallContext::new(principal(3), T0);

        let mut registry = HashRegistry::new(Principal::derive("registry", "test"), admin.caller);
        registry
            .grant_role(&admin, CERTIFICATION_MANAGER_ROLE, manager.caller)
            .unwrap();
        registry.set_url_verifier_router(&admin, verifier.caller).unwrap();
        registry
            .register_storage_type(&admin, "ArweaveV1", principal(9))
            .unwrap();

        Setup {
            registry,
            admin,
            manager,
            verifier,
        }
    }

    fn at(ctx: CallContext, now: Timestamp) -> CallContext {
        CallContext { now, ..ctx }
    }

    fn hash() -> ContentHash {
        ContentHash::digest(b"certified file")
    }

    const URL: &str = "https://arweave.net/abc";

    #[test]
    fn test_register_storage_type_replaces() {
        let mut s = setup();
        assert_eq!(s.registry.storage_type("ArweaveV1").unwrap().handler, principal(9));

        let old = s
            .registry
            .register_storage_type(&s.admin, "ArweaveV1", principal(10))
            .unwrap();
        assert_eq!(old, Some(principal(9)));
        assert_eq!(s.registry.storage_type("ArweaveV1").unwrap().handler, principal(10));
        assert_eq!(s.registry.storage_types().count(), 1);
    }

    #[test]
    fn test_register_storage_type_requires_role() {
        let mut s = setup();
        let err = s
            .registry
            .register_storage_type(&s.manager, "IpfsV1", principal(11))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        assert!(s.registry.storage_type("IpfsV1").is_none());
    }

    #[test]
    fn test_set_url_verifier_router_moves_role() {
        let mut s = setup();
        let new_router = principal(4);

        let old = s.registry.set_url_verifier_router(&s.admin, new_router).unwrap();
        assert_eq!(old, Some(s.verifier.caller));
        assert!(s.registry.access().has_role(URL_VERIFIER_ROUTER_ROLE, &new_router));
        assert!(!s.registry.access().has_role(URL_VERIFIER_ROUTER_ROLE, &s.verifier.caller));

        let err = s.registry.set_url_verifier_router(&s.manager, principal(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[test]
    fn test_record_certification() {
        let mut s = setup();
        let a = TokenId::encode(0, 5).unwrap();
        let b = TokenId::encode(1, 5).unwrap();

        s.registry.record_certification(&s.manager, hash(), a).unwrap();
        s.registry
            .record_certification(&at(s.manager, T0 + 10), hash(), b)
            .unwrap();

        assert_eq!(s.registry.certifications(&hash()), &[a, b]);
        assert_eq!(s.registry.record(&hash()).unwrap().first_certified_at, Some(T0));
        assert!(s.registry.certifications(&ContentHash::ZERO).is_empty());

        let err = s.registry.record_certification(&s.admin, hash(), a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[test]
    fn test_open_verification_queues_request() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", 14 * DAY)
            .unwrap();

        let record = s.registry.verification(&hash()).unwrap();
        assert_eq!(record.expires_at, T0 + 14 * DAY as i64);
        assert_eq!(s.registry.verification_status(&hash(), T0), Some(VerificationStatus::Pending));

        let requests = s.registry.drain_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].verifier, s.verifier.caller);
        assert_eq!(requests[0].handler, principal(9));
        assert!(s.registry.drain_requests().is_empty());
    }

    #[test]
    fn test_acknowledge_requests_keeps_undelivered() {
        let mut s = setup();
        let other = ContentHash::digest(b"second file");
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();
        s.registry
            .open_verification(&s.manager, other, URL, "ArweaveV1", DAY)
            .unwrap();

        s.registry.acknowledge_requests(1);
        assert_eq!(s.registry.pending_requests().len(), 1);
        assert_eq!(s.registry.pending_requests()[0].hash, other);

        s.registry.acknowledge_requests(10);
        assert!(s.registry.pending_requests().is_empty());
    }

    #[test]
    fn test_open_verification_failures() {
        let mut s = setup();

        let err = s
            .registry
            .open_verification(&s.manager, hash(), URL, "Unknown", DAY)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = s
            .registry
            .open_verification(&s.admin, hash(), URL, "ArweaveV1", DAY)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let mut unconfigured = HashRegistry::new(principal(20), s.admin.caller);
        unconfigured
            .grant_role(&s.admin, CERTIFICATION_MANAGER_ROLE, s.manager.caller)
            .unwrap();
        unconfigured
            .register_storage_type(&s.admin, "ArweaveV1", principal(9))
            .unwrap();
        let err = unconfigured
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap_err();
        assert_eq!(err, ContractError::Uninitialized("url verifier router"));

        assert!(s.registry.verification(&hash()).is_none());
        assert!(s.registry.pending_requests().is_empty());
    }

    #[test]
    fn test_reopen_while_pending_fails() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();

        let err = s
            .registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        // after expiry a new record replaces the old one
        let later = at(s.manager, T0 + DAY as i64 + 1);
        s.registry
            .open_verification(&later, hash(), URL, "ArweaveV1", DAY)
            .unwrap();
        assert_eq!(
            s.registry.verification(&hash()).unwrap().requested_at,
            later.now
        );
    }

    #[test]
    fn test_resolve_before_expiry() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();

        let err = s
            .registry
            .resolve_verification(&s.manager, &hash(), T0, VerificationOutcome::Verified)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let status = s
            .registry
            .resolve_verification(&s.verifier, &hash(), T0, VerificationOutcome::Verified)
            .unwrap();
        assert_eq!(status, VerificationStatus::Verified);

        // a resolved record can't be resolved again
        let err = s
            .registry
            .resolve_verification(&s.verifier, &hash(), T0, VerificationOutcome::Failed)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        // but may be replaced
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();
    }

    #[test]
    fn test_resolve_after_expiry_fails() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();

        let late = at(s.verifier, T0 + DAY as i64 + 1);
        let err = s
            .registry
            .resolve_verification(&late, &hash(), T0, VerificationOutcome::Verified)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(
            s.registry.verification_status(&hash(), late.now),
            Some(VerificationStatus::Expired)
        );

        let err = s
            .registry
            .resolve_verification(&s.verifier, &ContentHash::ZERO, T0, VerificationOutcome::Verified)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_reopened_record_refuses_earlier_verdict() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();

        let reopen = T0 + DAY as i64 + 1;
        s.registry
            .open_verification(&at(s.manager, reopen), hash(), "https://arweave.net/new", "ArweaveV1", DAY)
            .unwrap();

        let verifier = at(s.verifier, reopen);
        let err = s
            .registry
            .resolve_verification(&verifier, &hash(), T0, VerificationOutcome::Verified)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(
            s.registry.verification_status(&hash(), reopen),
            Some(VerificationStatus::Pending)
        );

        let status = s
            .registry
            .resolve_verification(&verifier, &hash(), reopen, VerificationOutcome::Verified)
            .unwrap();
        assert_eq!(status, VerificationStatus::Verified);
    }

    #[test]
    fn test_extend_before_and_after_expiry() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();

        let expiry = s
            .registry
            .extend_verification(&at(s.manager, T0 + 100), &hash(), DAY)
            .unwrap();
        assert_eq!(expiry, T0 + 2 * DAY as i64);

        let late = at(s.manager, T0 + 2 * DAY as i64 + 1);
        let err = s.registry.extend_verification(&late, &hash(), DAY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(s.registry.verification(&hash()).unwrap().expires_at, expiry);
    }

    #[test]
    fn test_extend_resolved_fails() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();
        s.registry
            .resolve_verification(&s.verifier, &hash(), T0, VerificationOutcome::Failed)
            .unwrap();

        let err = s.registry.extend_verification(&s.manager, &hash(), DAY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = s
            .registry
            .extend_verification(&s.manager, &ContentHash::ZERO, DAY)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_paused_blocks_verification_ops() {
        let mut s = setup();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();
        s.registry.pause(&s.admin).unwrap();

        let other = ContentHash::digest(b"other");
        assert_eq!(
            s.registry
                .open_verification(&s.manager, other, URL, "ArweaveV1", DAY)
                .unwrap_err(),
            ContractError::Paused
        );
        assert_eq!(
            s.registry.extend_verification(&s.manager, &hash(), DAY).unwrap_err(),
            ContractError::Paused
        );
        assert_eq!(
            s.registry
                .resolve_verification(&s.verifier, &hash(), T0, VerificationOutcome::Verified)
                .unwrap_err(),
            ContractError::Paused
        );

        s.registry.unpause(&s.admin).unwrap();
        s.registry
            .resolve_verification(&s.verifier, &hash(), T0, VerificationOutcome::Verified)
            .unwrap();
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut s = setup();
        s.registry
            .record_certification(&s.manager, hash(), TokenId::encode(0, 1).unwrap())
            .unwrap();
        s.registry
            .open_verification(&s.manager, hash(), URL, "ArweaveV1", DAY)
            .unwrap();

        let mut buf = Vec::new();
        ciborium::into_writer(&s.registry, &mut buf).unwrap();
        let restored: HashRegistry = ciborium::from_reader(&buf[..]).unwrap();
        assert_eq!(restored, s.registry);
    }

    proptest! {
        #[test]
        fn prop_extension_pushes_expiry_forward(validity in 0u64..1_000_000, extra in 0u64..1_000_000, elapsed in 0u64..1_000_000) {
            let mut s = setup();
            s.registry.open_verification(&s.manager, hash(), URL, "ArweaveV1", validity).unwrap();
            let expiry = T0 + validity as i64;
            let now = at(s.manager, T0 + elapsed as i64);

            let result = s.registry.extend_verification(&now, &hash(), extra);
            if now.now > expiry {
                prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);
            } else {
                prop_assert_eq!(result.unwrap(), expiry + extra as i64);
            }
        }
    }
}
