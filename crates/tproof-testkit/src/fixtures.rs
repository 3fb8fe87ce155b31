//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use anyhow::{ensure, Context};

use tproof::oracle::{MemoryNetwork, MemoryTransport, MockOracle};
use tproof::registry::VerificationStatus;
use tproof::router::ProofsCreated;
use tproof::store::MemoryStore;
use tproof::{
    Amount, Chain, Clock, ContentHash, Keypair, Principal, TProofConfig, Timestamp, TokenId,
    ARWEAVE_V1,
};

/// Genesis time of every fixture chain.
pub const GENESIS: Timestamp = 1_700_000_000;

/// Balance credited to the fixture user at genesis.
pub const FUNDS: Amount = 1_000_000;

/// A deployed chain with an admin, a funded user, a withdraw wallet and
/// a scripted oracle.
pub struct TestFixture {
    pub admin: Principal,
    pub user: Principal,
    pub wallet: Principal,
    pub oracle: MockOracle,
    pub config: TProofConfig,
    pub chain: Chain<MemoryStore>,
}

/// Both ends of an in-memory connection between the chain's url-verifier
/// router and the fixture oracle.
pub struct OracleLink {
    pub network: Arc<MemoryNetwork>,
    pub chain_end: MemoryTransport,
    pub oracle_end: MemoryTransport,
}

impl TestFixture {
    /// Create a new test fixture with random identities.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create with deterministic identities from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let tag = hex::encode(seed);
        let mut config = TProofConfig::with_admin(Principal::derive("tproof-testkit-admin", &tag));
        config.withdraw_wallet = Some(Principal::derive("tproof-testkit-wallet", &tag));
        config.genesis_time = GENESIS;

        let oracle = MockOracle::new(Keypair::from_seed(&seed));
        Self::with_config(config, oracle).expect("fixture configuration is valid")
    }

    /// Deploy `config` and fund a user derived from the admin.
    ///
    /// The config's oracle key is replaced by the oracle's own.
    pub fn with_config(mut config: TProofConfig, oracle: MockOracle) -> anyhow::Result<Self> {
        config.oracle.oracle_key = oracle.principal();
        let admin = config.admin;
        let wallet = config.withdraw_wallet.unwrap_or(admin);
        let user = Principal::derive("tproof-testkit-user", &admin.to_hex());

        let mut chain = Chain::deploy(&config, MemoryStore::new(), Clock::manual(config.genesis_time))
            .context("deploying fixture chain")?;
        chain.fund(user, FUNDS).context("funding fixture user")?;

        Ok(Self {
            admin,
            user,
            wallet,
            oracle,
            config,
            chain,
        })
    }

    /// Price of a batch at the current pricing.
    pub fn quote(&self, mints: usize, verifications: usize) -> anyhow::Result<Amount> {
        Ok(self.chain.router().pricing().quote(mints, verifications)?)
    }

    /// Certify one piece of content as the fixture user, paying the
    /// exact price.
    pub fn certify(&mut self, content: &[u8], verify: bool) -> anyhow::Result<(ContentHash, TokenId)> {
        let created = self.certify_batch(&[content], verify)?;
        let id = created
            .token_ids
            .first()
            .copied()
            .context("no certificate minted")?;
        Ok((ContentHash::digest(content), id))
    }

    /// Certify several pieces of content in one call, all stored as
    /// [`ARWEAVE_V1`].
    pub fn certify_batch(&mut self, contents: &[&[u8]], verify: bool) -> anyhow::Result<ProofsCreated> {
        let n = contents.len();
        let hashes: Vec<ContentHash> = contents.iter().map(|c| ContentHash::digest(c)).collect();
        let titles: Vec<String> = (0..n).map(|i| format!("document {i}")).collect();
        let value = self.quote(n, if verify { n } else { 0 })?;

        let created = self
            .chain
            .create_proofs(
                self.user,
                value,
                &hashes,
                &titles,
                &vec![verify; n],
                &vec![ARWEAVE_V1.to_string(); n],
                self.user,
                self.user,
            )
            .with_context(|| format!("certifying a batch of {n}"))?;
        ensure!(created.token_ids.len() == n, "minted {} of {n}", created.token_ids.len());
        Ok(created)
    }

    /// Connect the chain's url-verifier router and the oracle on a fresh
    /// in-memory network.
    pub async fn connect_oracle(&self) -> OracleLink {
        let network = MemoryNetwork::new();
        let chain_end = network.connect(self.chain.url_verifier().principal()).await;
        let oracle_end = network.connect(self.oracle.principal()).await;
        OracleLink {
            network,
            chain_end,
            oracle_end,
        }
    }

    /// Dispatch every queued verification, let the oracle answer each one
    /// and apply the answers.
    ///
    /// Returns the resulting statuses in dispatch order.
    pub async fn run_oracle_round(&mut self, link: &OracleLink) -> anyhow::Result<Vec<VerificationStatus>> {
        let sent = self
            .chain
            .dispatch_verifications(&link.chain_end)
            .await
            .context("dispatching verifications")?;

        let mut statuses = Vec::with_capacity(sent.len());
        for _ in &sent {
            self.oracle
                .serve_one(&link.oracle_end)
                .await
                .context("oracle answering")?;
            let status = self
                .chain
                .await_oracle(&link.chain_end)
                .await?
                .context("oracle answer did not arrive")?;
            statuses.push(status);
        }
        Ok(statuses)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}
