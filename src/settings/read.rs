//! Build the settings form from `bitcoin.conf`

use super::{NodeSettings, Peer, Pruning, SerialVersion, SettingsError};
use crate::conf::{ConfFile, ConfValues, ConfigKey};
use std::str::FromStr;

/// Top-level keys the settings form reads.
pub const SETTINGS_KEYS: &[&str] = &[
    "rpcbind",
    "rpcallowip",
    "rpcuser",
    "rpcpassword",
    "rpcauth",
    "rpcserialversion",
    "rpcservertimeout",
    "rpcthreads",
    "rpcworkqueue",
    "mempoolfullrbf",
    "persistmempool",
    "maxmempool",
    "mempoolexpiry",
    "listen",
    "bind",
    "connect",
    "addnode",
    "onlynet",
    "whitelist",
    "prune",
    "dbcache",
    "disablewallet",
    "avoidpartialspends",
    "discardfee",
    "zmqpubrawblock",
    "zmqpubhashblock",
    "zmqpubrawtx",
    "zmqpubhashtx",
    "zmqpubsequence",
    "txindex",
    "peerbloomfilters",
    "blockfilterindex",
    "peerblockfilters",
];

pub fn read_settings(conf: &ConfFile) -> Result<NodeSettings, SettingsError> {
    let keys: Vec<ConfigKey> = SETTINGS_KEYS.iter().map(|k| ConfigKey::top(*k)).collect();
    let values = conf.read_keys(&keys)?;
    Ok(settings_from_values(&values))
}

pub fn settings_from_values(conf: &ConfValues) -> NodeSettings {
    let mut s = NodeSettings::default();

    s.rpc.enable = !conf.top("rpcbind").is_empty();
    if let Some(user) = conf.first("rpcuser") {
        s.rpc.username = user.to_string();
    }
    s.rpc.password = conf.first("rpcpassword").map(str::to_string);
    s.rpc.advanced.auth = conf.top("rpcauth").to_vec();
    s.rpc.advanced.serialversion = match conf.first("rpcserialversion") {
        Some("0") => SerialVersion::NonSegwit,
        _ => SerialVersion::Segwit,
    };
    s.rpc.advanced.servertimeout =
        number(conf, "rpcservertimeout", s.rpc.advanced.servertimeout);
    s.rpc.advanced.threads = number(conf, "rpcthreads", s.rpc.advanced.threads);
    s.rpc.advanced.workqueue = number(conf, "rpcworkqueue", s.rpc.advanced.workqueue);

    s.zmq_enabled = !conf.top("zmqpubrawblock").is_empty();
    s.txindex = conf.first("txindex") == Some("1");

    s.wallet.enable = conf.first("disablewallet") != Some("1");
    s.wallet.avoidpartialspends = flag(conf, "avoidpartialspends", true);
    s.wallet.discardfee = number(conf, "discardfee", s.wallet.discardfee);

    let advanced = &mut s.advanced;
    advanced.blockfilters.blockfilterindex =
        matches!(conf.first("blockfilterindex"), Some("basic") | Some("1"));
    advanced.blockfilters.peerblockfilters = conf.first("peerblockfilters") == Some("1");
    advanced.bloomfilters.peerbloomfilters = conf.first("peerbloomfilters") == Some("1");
    advanced.dbcache = conf.first("dbcache").and_then(|v| parse_logged("dbcache", v));

    advanced.mempool.maxmempool = number(conf, "maxmempool", advanced.mempool.maxmempool);
    advanced.mempool.mempoolexpiry = number(conf, "mempoolexpiry", advanced.mempool.mempoolexpiry);
    advanced.mempool.mempoolfullrbf = flag(conf, "mempoolfullrbf", false);
    advanced.mempool.persistmempool = flag(conf, "persistmempool", true);

    let peers = &mut advanced.peers;
    peers.addnode = conf
        .top("addnode")
        .iter()
        .chain(conf.top("connect"))
        .map(|addr| Peer::parse(addr))
        .collect();
    peers.listen = flag(conf, "listen", true);
    peers.onlyconnect = !conf.top("connect").is_empty();
    peers.onlyonion = conf.top("onlynet").iter().any(|net| net == "onion");

    advanced.pruning = match conf.first("prune") {
        None | Some("0") => Pruning::Disabled,
        Some("1") => Pruning::Manual,
        Some(size) => match parse_logged("prune", size) {
            Some(size) => Pruning::Automatic { size },
            None => Pruning::Disabled,
        },
    };

    s
}

/// `1`/`0` toggle; anything else falls back to `default`.
pub(crate) fn flag(conf: &ConfValues, name: &str, default: bool) -> bool {
    match conf.first(name) {
        Some("1") => true,
        Some("0") => false,
        None => default,
        Some(other) => {
            tracing::warn!("Ignoring non-boolean {}={}", name, other);
            default
        }
    }
}

pub(crate) fn number<T: FromStr>(conf: &ConfValues, name: &str, default: T) -> T {
    conf.first(name).and_then(|v| parse_logged(name, v)).unwrap_or(default)
}

pub(crate) fn parse_logged<T: FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={}", name, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::ConfDocument;

    fn read(text: &str) -> NodeSettings {
        let keys: Vec<ConfigKey> = SETTINGS_KEYS.iter().map(|k| ConfigKey::top(*k)).collect();
        settings_from_values(&ConfDocument::parse(text).read_selected(&keys))
    }

    #[test]
    fn empty_file_turns_optional_features_off() {
        let s = read("");
        assert!(!s.rpc.enable);
        assert!(!s.zmq_enabled);
        assert!(!s.txindex);
        assert!(s.wallet.enable);
        assert_eq!(s.rpc.username, "bitcoin");
        assert_eq!(s.rpc.advanced.threads, 16);
        assert_eq!(s.advanced.pruning, Pruning::Disabled);
        assert!(!s.advanced.blockfilters.blockfilterindex);
        assert!(s.advanced.peers.listen);
    }

    #[test]
    fn reads_typical_config() {
        let s = read(
            "rpcbind=0.0.0.0:8332\nrpcuser=satoshi\nrpcserialversion=0\nrpcthreads=32\n\
             disablewallet=1\ndiscardfee=0.0002\ntxindex=1\nblockfilterindex=basic\n\
             zmqpubrawblock=tcp://0.0.0.0:28332\nprune=2000\nonlynet=onion\nlisten=0\n",
        );
        assert!(s.rpc.enable);
        assert_eq!(s.rpc.username, "satoshi");
        assert_eq!(s.rpc.advanced.serialversion, SerialVersion::NonSegwit);
        assert_eq!(s.rpc.advanced.threads, 32);
        assert!(!s.wallet.enable);
        assert_eq!(s.wallet.discardfee, 0.0002);
        assert!(s.txindex);
        assert!(s.zmq_enabled);
        assert!(s.advanced.blockfilters.blockfilterindex);
        assert_eq!(s.advanced.pruning, Pruning::Automatic { size: 2000 });
        assert!(s.advanced.peers.onlyonion);
        assert!(!s.advanced.peers.listen);
    }

    #[test]
    fn connect_peers_follow_addnode_peers() {
        let s = read("addnode=1.1.1.1:8333\nconnect=2.2.2.2:8333\n");
        let addrs: Vec<String> = s.advanced.peers.addnode.iter().map(ToString::to_string).collect();
        assert_eq!(addrs, vec!["1.1.1.1:8333", "2.2.2.2:8333"]);
        assert!(s.advanced.peers.onlyconnect);
    }

    #[test]
    fn prune_one_is_manual_and_garbage_falls_back() {
        assert_eq!(read("prune=1\n").advanced.pruning, Pruning::Manual);
        assert_eq!(read("prune=lots\n").advanced.pruning, Pruning::Disabled);
        assert_eq!(read("rpcthreads=many\n").rpc.advanced.threads, 16);
    }

    #[test]
    fn section_values_are_not_read_as_top_level() {
        let s = read("[test]\nrpcbind=127.0.0.1\ntxindex=1\n");
        assert!(!s.rpc.enable);
        assert!(!s.txindex);
    }
}
