//! Certificate records.

use serde::{Deserialize, Serialize};

use tproof_core::{ContentHash, Principal, Timestamp, TokenId};

/// A minted certificate.
///
/// `id`, `hash`, `nft_number` and `minted_at` never change after mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: TokenId,
    pub owner: Principal,
    pub hash: ContentHash,
    pub title: String,
    pub description: String,
    /// Position in the ledger's mint order.
    pub nft_number: u128,
    pub minted_at: Timestamp,
}

impl Certificate {
    pub(crate) fn new(
        id: TokenId,
        owner: Principal,
        hash: ContentHash,
        title: String,
        minted_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            hash,
            title,
            description: String::new(),
            nft_number: id.nft_number(),
            minted_at,
        }
    }
}
