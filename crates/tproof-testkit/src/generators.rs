//! Proptest generators for property-based testing.

use proptest::prelude::*;

use tproof_core::{Amount, ContentHash, Keypair, NftNum, Principal, Timestamp, TokenId};
use tproof_oracle::OracleRequest;
use tproof_registry::VerificationRequest;
use tproof_router::PricingParameters;

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random non-zero Principal.
pub fn principal() -> impl Strategy<Value = Principal> {
    any::<[u8; 32]>()
        .prop_filter("zero principal", |b| *b != [0u8; 32])
        .prop_map(Principal::from_bytes)
}

/// Generate a random ContentHash.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    any::<[u8; 32]>().prop_map(ContentHash::from_bytes)
}

/// Generate a usable chain scope (scope 0 has no encoded form).
pub fn chain_scope() -> impl Strategy<Value = u64> {
    1u64..=u64::MAX
}

/// Generate an encoded TokenId.
pub fn token_id() -> impl Strategy<Value = TokenId> {
    (any::<u128>(), chain_scope())
        .prop_filter_map("scope 0", |(n, scope)| TokenId::encode(n, scope))
}

/// Generate a certificate reference in either of its accepted forms.
pub fn nft_num() -> impl Strategy<Value = NftNum> {
    prop_oneof![
        any::<u128>().prop_map(NftNum::Raw),
        token_id().prop_map(NftNum::Encoded),
    ]
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    0i64..=i64::MAX / 2
}

/// Generate a certificate title.
pub fn title() -> impl Strategy<Value = String> {
    "[ -~]{0,64}".prop_map(String::from)
}

/// Generate a storage type name.
pub fn storage_type() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{1,15}V[0-9]".prop_map(String::from)
}

/// Generate pricing that cannot overflow for batches below `u32::MAX`.
pub fn pricing() -> impl Strategy<Value = PricingParameters> {
    (0..=1_000_000 as Amount, 0..=1_000_000 as Amount, 1u64..=86_400 * 365, any::<bool>()).prop_map(
        |(mint_price, verification_price, validity_secs, verification_enabled)| PricingParameters {
            mint_price,
            verification_price,
            validity_secs,
            verification_enabled,
        },
    )
}

/// Generate an oracle request.
pub fn oracle_request() -> impl Strategy<Value = OracleRequest> {
    (
        "[a-z0-9-]{1,32}",
        content_hash(),
        "(https://[a-z]{1,12}\\.net/[a-zA-Z0-9]{0,43})?",
        storage_type(),
        principal(),
        timestamp(),
        0u64..=86_400 * 30,
        principal(),
    )
        .prop_map(|(job, hash, url, storage_type, handler, at, validity, verifier)| {
            OracleRequest::new(
                job,
                VerificationRequest {
                    hash,
                    url,
                    storage_type,
                    handler,
                    requested_at: at,
                    expires_at: at.saturating_add(validity as i64),
                    verifier,
                },
            )
        })
}

/// A `create_proofs` batch with distinct content hashes.
#[derive(Debug, Clone)]
pub struct CertifyBatch {
    pub hashes: Vec<ContentHash>,
    pub titles: Vec<String>,
    pub with_verification: Vec<bool>,
}

impl CertifyBatch {
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Number of items asking for verification.
    pub fn verifications(&self) -> usize {
        self.with_verification.iter().filter(|v| **v).count()
    }
}

impl Arbitrary for CertifyBatch {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::btree_set(content_hash(), 1..8)
            .prop_flat_map(|hashes| {
                let n = hashes.len();
                (
                    Just(hashes.into_iter().collect::<Vec<_>>()),
                    prop::collection::vec(title(), n),
                    prop::collection::vec(any::<bool>(), n),
                )
            })
            .prop_map(|(hashes, titles, with_verification)| CertifyBatch {
                hashes,
                titles,
                with_verification,
            })
            .boxed()
    }
}
