//! Traffic accounting categories.

use crate::message_type::*;

/// Coarse bucket a message is counted under for traffic statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficCategory {
    /// Keepalive and peer status.
    Base,
    /// Cluster membership.
    Cluster,
    /// Overlay maintenance such as endpoint gossip.
    Overlay,
    /// Validator manifests.
    Manifests,
    /// Relayed transactions.
    Transaction,
    /// Consensus proposals.
    Proposal,
    /// Ledger validations.
    Validation,
    /// Published validator lists.
    ValidatorList,
    /// Ledger requests.
    LedgerGet,
    /// Ledger responses.
    LedgerShare,
    /// Object-by-hash traffic.
    Objects,
    /// Transaction set announcements.
    TxSet,
    /// Shard information.
    Shards,
    /// Anything else.
    Unknown,
}

impl TrafficCategory {
    /// Every category, in display order.
    pub const ALL: [TrafficCategory; 14] = [
        Self::Base,
        Self::Cluster,
        Self::Overlay,
        Self::Manifests,
        Self::Transaction,
        Self::Proposal,
        Self::Validation,
        Self::ValidatorList,
        Self::LedgerGet,
        Self::LedgerShare,
        Self::Objects,
        Self::TxSet,
        Self::Shards,
        Self::Unknown,
    ];

    /// Category for a message type code.
    pub fn categorize(message_type: u16) -> Self {
        match message_type {
            PING | STATUS_CHANGE => Self::Base,
            CLUSTER => Self::Cluster,
            ENDPOINTS => Self::Overlay,
            MANIFESTS => Self::Manifests,
            TRANSACTION => Self::Transaction,
            PROPOSE_LEDGER => Self::Proposal,
            VALIDATION => Self::Validation,
            VALIDATOR_LIST => Self::ValidatorList,
            GET_LEDGER => Self::LedgerGet,
            LEDGER_DATA => Self::LedgerShare,
            GET_OBJECTS => Self::Objects,
            HAVE_SET => Self::TxSet,
            GET_SHARD_INFO | SHARD_INFO | GET_PEER_SHARD_INFO | PEER_SHARD_INFO => Self::Shards,
            _ => Self::Unknown,
        }
    }

    /// Short name used in logs and statistics output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "overhead",
            Self::Cluster => "overhead_cluster",
            Self::Overlay => "overhead_overlay",
            Self::Manifests => "overhead_manifest",
            Self::Transaction => "transactions",
            Self::Proposal => "proposals",
            Self::Validation => "validations",
            Self::ValidatorList => "validator_lists",
            Self::LedgerGet => "ledger_get",
            Self::LedgerShare => "ledger_share",
            Self::Objects => "getobject",
            Self::TxSet => "set_get",
            Self::Shards => "shards",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TrafficCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_type_has_a_category() {
        for id in KNOWN {
            assert_ne!(
                TrafficCategory::categorize(id),
                TrafficCategory::Unknown,
                "{}",
                message_name(id)
            );
        }
        assert_eq!(TrafficCategory::categorize(0), TrafficCategory::Unknown);
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = TrafficCategory::ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TrafficCategory::ALL.len());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(TrafficCategory::Shards.to_string(), "shards");
    }
}
