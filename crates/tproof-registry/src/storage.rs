//! Storage-type descriptors.

use serde::{Deserialize, Serialize};

use tproof_core::{Principal, Timestamp};

/// A named handler describing where certified content is stored,
/// e.g. `ArweaveV1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageTypeDescriptor {
    pub name: String,
    pub handler: Principal,
    pub registered_at: Timestamp,
}
