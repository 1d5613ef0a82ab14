//! Protocol message type codes.
//!
//! The 16-bit code in the low bytes of every header selects the payload
//! decoder. Codes not listed here are legal on the wire and reported to the
//! handler as unknown.

/// Validator manifests.
pub const MANIFESTS: u16 = 2;

/// Keepalive and latency probe.
pub const PING: u16 = 3;

/// Cluster node status.
pub const CLUSTER: u16 = 5;

/// Peer endpoint gossip.
pub const ENDPOINTS: u16 = 15;

/// Relayed transaction.
pub const TRANSACTION: u16 = 30;

/// Ledger request.
pub const GET_LEDGER: u16 = 31;

/// Ledger response data.
pub const LEDGER_DATA: u16 = 32;

/// Consensus proposal.
pub const PROPOSE_LEDGER: u16 = 33;

/// Peer status change.
pub const STATUS_CHANGE: u16 = 34;

/// Transaction set availability.
pub const HAVE_SET: u16 = 35;

/// Ledger validation.
pub const VALIDATION: u16 = 41;

/// Object-by-hash request or reply.
pub const GET_OBJECTS: u16 = 42;

/// Shard info request.
pub const GET_SHARD_INFO: u16 = 50;

/// Shard info reply.
pub const SHARD_INFO: u16 = 51;

/// Peer shard info request.
pub const GET_PEER_SHARD_INFO: u16 = 52;

/// Peer shard info reply.
pub const PEER_SHARD_INFO: u16 = 53;

/// Published validator list.
pub const VALIDATOR_LIST: u16 = 54;

/// Every type code with a known payload.
pub const KNOWN: [u16; 17] = [
    MANIFESTS,
    PING,
    CLUSTER,
    ENDPOINTS,
    TRANSACTION,
    GET_LEDGER,
    LEDGER_DATA,
    PROPOSE_LEDGER,
    STATUS_CHANGE,
    HAVE_SET,
    VALIDATION,
    GET_OBJECTS,
    GET_SHARD_INFO,
    SHARD_INFO,
    GET_PEER_SHARD_INFO,
    PEER_SHARD_INFO,
    VALIDATOR_LIST,
];

/// Returns a human-readable name for a message type code.
pub fn message_name(id: u16) -> &'static str {
    match id {
        MANIFESTS => "manifests",
        PING => "ping",
        CLUSTER => "cluster",
        ENDPOINTS => "endpoints",
        TRANSACTION => "tx",
        GET_LEDGER => "get_ledger",
        LEDGER_DATA => "ledger_data",
        PROPOSE_LEDGER => "propose",
        STATUS_CHANGE => "status",
        HAVE_SET => "have_set",
        VALIDATION => "validation",
        GET_OBJECTS => "get_objects",
        GET_SHARD_INFO => "get_shard_info",
        SHARD_INFO => "shard_info",
        GET_PEER_SHARD_INFO => "get_peer_shard_info",
        PEER_SHARD_INFO => "peer_shard_info",
        VALIDATOR_LIST => "validator_list",
        _ => "unknown",
    }
}

/// Returns true if messages of this type may be sent compressed.
///
/// Latency-sensitive consensus and control traffic is never compressed.
pub fn is_compressible(id: u16) -> bool {
    matches!(
        id,
        MANIFESTS
            | ENDPOINTS
            | TRANSACTION
            | GET_LEDGER
            | LEDGER_DATA
            | GET_OBJECTS
            | VALIDATOR_LIST
    )
}

/// Returns true if the type code has a known payload.
pub fn is_known(id: u16) -> bool {
    KNOWN.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(message_name(LEDGER_DATA), "ledger_data");
        assert_eq!(message_name(TRANSACTION), "tx");
        assert_eq!(message_name(999), "unknown");
    }

    #[test]
    fn compressible_allow_list() {
        let compressible = [
            MANIFESTS,
            ENDPOINTS,
            TRANSACTION,
            GET_LEDGER,
            LEDGER_DATA,
            GET_OBJECTS,
            VALIDATOR_LIST,
        ];
        for id in compressible {
            assert!(is_compressible(id), "{}", message_name(id));
        }
        for id in [PING, CLUSTER, PROPOSE_LEDGER, STATUS_CHANGE, HAVE_SET, VALIDATION, SHARD_INFO] {
            assert!(!is_compressible(id), "{}", message_name(id));
        }
        assert!(!is_compressible(1000));
    }

    #[test]
    fn known_codes() {
        assert!(KNOWN.iter().all(|id| is_known(*id)));
        assert!(KNOWN.iter().all(|id| message_name(*id) != "unknown"));
        assert!(!is_known(0));
    }
}
