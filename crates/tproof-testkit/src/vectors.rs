//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the encodings that every implementation must agree
//! on: the decimal form of certificate identifiers, content digests and
//! the oracle's signing keys.

use anyhow::{ensure, Context};
use serde::Serialize;

use tproof_core::{ContentHash, Keypair, NftNum, TokenId};

/// A golden vector for the certificate identifier encoding.
#[derive(Debug, Clone, Serialize)]
pub struct TokenIdVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub chain_scope: u64,
    pub nft_number: u128,
    /// Expected decimal rendering.
    pub expected_decimal: &'static str,
}

/// A golden vector for content digests.
#[derive(Debug, Clone, Serialize)]
pub struct DigestVector {
    pub name: &'static str,
    pub content: &'static [u8],
    /// Expected digest (hex).
    pub expected_hash: &'static str,
}

/// A golden vector for oracle keys and signatures (RFC 8032, test 1).
#[derive(Debug, Clone, Serialize)]
pub struct SignatureVector {
    pub name: &'static str,
    /// Seed for deterministic key generation (hex).
    pub seed: &'static str,
    pub message: &'static [u8],
    /// Expected principal (hex).
    pub expected_principal: &'static str,
    /// Expected signature (hex).
    pub expected_signature: &'static str,
}

/// Get all identifier vectors.
pub fn token_id_vectors() -> Vec<TokenIdVector> {
    vec![
        TokenIdVector {
            name: "first certificate in scope 1",
            chain_scope: 1,
            nft_number: 0,
            expected_decimal: "100000000000000000000000000000000000000000000000000",
        },
        TokenIdVector {
            name: "certificate 42 in scope 1337",
            chain_scope: 1337,
            nft_number: 42,
            expected_decimal: "133700000000000000000000000000000000000000000000000042",
        },
        TokenIdVector {
            name: "largest identifier",
            chain_scope: u64::MAX,
            nft_number: u128::MAX,
            expected_decimal:
                "1844674407370955161500000000000340282366920938463463374607431768211455",
        },
    ]
}

/// Get all digest vectors.
pub fn digest_vectors() -> Vec<DigestVector> {
    vec![DigestVector {
        name: "empty content",
        content: b"",
        expected_hash: "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262",
    }]
}

/// Get all signature vectors.
pub fn signature_vectors() -> Vec<SignatureVector> {
    vec![SignatureVector {
        name: "RFC 8032 test 1",
        seed: "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        message: b"",
        expected_principal: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        expected_signature: "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
    }]
}

/// Render every vector for an identifier.
pub fn render_token_id(vector: &TokenIdVector) -> anyhow::Result<String> {
    let id = TokenId::encode(vector.nft_number, vector.chain_scope)
        .with_context(|| format!("{}: scope has no encoded form", vector.name))?;
    Ok(id.to_string())
}

fn seed(vector: &SignatureVector) -> anyhow::Result<[u8; 32]> {
    hex::decode(vector.seed)?
        .try_into()
        .map_err(|_| anyhow::anyhow!("{}: seed is not 32 bytes", vector.name))
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, got)` for each vector.
pub fn verify_all_vectors() -> anyhow::Result<Vec<(String, bool, String)>> {
    let mut results = Vec::new();

    for v in token_id_vectors() {
        let got = render_token_id(&v)?;
        results.push((v.name.to_string(), got == v.expected_decimal, got));
    }

    for v in digest_vectors() {
        let got = ContentHash::digest(v.content).to_hex();
        results.push((v.name.to_string(), got == v.expected_hash, got));
    }

    for v in signature_vectors() {
        let keypair = Keypair::from_seed(&seed(&v)?);
        let principal = keypair.principal().to_hex();
        let signature = keypair.sign(v.message).to_hex();
        let matches = principal == v.expected_principal && signature == v.expected_signature;
        results.push((v.name.to_string(), matches, format!("{principal}/{signature}")));
    }

    Ok(results)
}

/// Export every vector as JSON, for implementations in other languages.
pub fn to_json() -> anyhow::Result<String> {
    #[derive(Serialize)]
    struct All {
        token_ids: Vec<TokenIdVector>,
        digests: Vec<DigestVector>,
        signatures: Vec<SignatureVector>,
    }

    let all = All {
        token_ids: token_id_vectors(),
        digests: digest_vectors(),
        signatures: signature_vectors(),
    };
    Ok(serde_json::to_string_pretty(&all)?)
}

/// Check that every identifier vector parses back to its parts.
pub fn check_token_id_parsing() -> anyhow::Result<()> {
    for v in token_id_vectors() {
        let parsed: NftNum = v.expected_decimal.parse()?;
        let expected = TokenId::encode(v.nft_number, v.chain_scope).context("scope 0")?;
        ensure!(parsed == NftNum::Encoded(expected), "{}: parsed {parsed:?}", v.name);
    }
    Ok(())
}
