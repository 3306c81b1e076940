//! Turn the settings form into `bitcoin.conf` updates

use super::{validate, NodeSettings, Pruning, SerialVersion, SettingsError};
use crate::conf::{ConfFile, ConfUpdates, ConfigKey, Merged};

const RPC_BIND_ALL: &str = "0.0.0.0:8332";
const RPC_ALLOW_ALL: &str = "0.0.0.0/0";
const PEER_BIND_ALL: &str = "0.0.0.0:8333";
const ZMQ_BLOCK_ENDPOINT: &str = "tcp://0.0.0.0:28332";
const ZMQ_TX_ENDPOINT: &str = "tcp://0.0.0.0:28333";
/// Container network allowed to bypass peer limits.
const WHITELIST: &str = "172.18.0.0/16";

fn when(on: bool, value: &str) -> Vec<String> {
    if on {
        vec![value.to_string()]
    } else {
        Vec::new()
    }
}

fn top(name: &str) -> ConfigKey {
    ConfigKey::top(name)
}

pub fn to_updates(s: &NodeSettings) -> ConfUpdates {
    let mut u = ConfUpdates::new();

    let rpc = &s.rpc;
    u.set(top("rpcbind"), when(rpc.enable, RPC_BIND_ALL))
        .set(top("rpcallowip"), when(rpc.enable, RPC_ALLOW_ALL))
        .set_one("rpcuser", rpc.username.as_str())
        .set(top("rpcpassword"), rpc.password.iter().cloned())
        .set(top("rpcauth"), rpc.advanced.auth.iter().cloned())
        .set_flag("rpcserialversion", rpc.advanced.serialversion == SerialVersion::Segwit)
        .set_one("rpcservertimeout", rpc.advanced.servertimeout.to_string())
        .set_one("rpcthreads", rpc.advanced.threads.to_string())
        .set_one("rpcworkqueue", rpc.advanced.workqueue.to_string());

    let mempool = &s.advanced.mempool;
    u.set_flag("mempoolfullrbf", mempool.mempoolfullrbf)
        .set_flag("persistmempool", mempool.persistmempool)
        .set_one("maxmempool", mempool.maxmempool.to_string())
        .set_one("mempoolexpiry", mempool.mempoolexpiry.to_string());

    let peers = &s.advanced.peers;
    let addrs: Vec<String> = peers.addnode.iter().map(ToString::to_string).collect();
    let (connect, addnode) =
        if peers.onlyconnect { (addrs, Vec::new()) } else { (Vec::new(), addrs) };
    u.set_flag("listen", peers.listen)
        .set(top("bind"), when(peers.listen, PEER_BIND_ALL))
        .set(top("connect"), connect)
        .set(top("addnode"), addnode)
        .set(top("onlynet"), when(peers.onlyonion, "onion"))
        .set_one("whitelist", WHITELIST);

    let prune = match s.advanced.pruning {
        Pruning::Disabled => Vec::new(),
        Pruning::Manual => vec!["1".to_string()],
        Pruning::Automatic { size } => vec![size.to_string()],
    };
    u.set(top("prune"), prune)
        .set(top("dbcache"), s.advanced.dbcache.map(|v| v.to_string()));

    u.set_flag("disablewallet", !s.wallet.enable)
        .set_flag("avoidpartialspends", s.wallet.avoidpartialspends)
        .set_one("discardfee", s.wallet.discardfee.to_string());

    u.set(top("zmqpubrawblock"), when(s.zmq_enabled, ZMQ_BLOCK_ENDPOINT))
        .set(top("zmqpubhashblock"), when(s.zmq_enabled, ZMQ_BLOCK_ENDPOINT))
        .set(top("zmqpubrawtx"), when(s.zmq_enabled, ZMQ_TX_ENDPOINT))
        .set(top("zmqpubhashtx"), when(s.zmq_enabled, ZMQ_TX_ENDPOINT))
        .set(top("zmqpubsequence"), when(s.zmq_enabled, ZMQ_TX_ENDPOINT));

    let filters = &s.advanced.blockfilters;
    u.set_flag("txindex", s.txindex)
        .set_flag("peerbloomfilters", s.advanced.bloomfilters.peerbloomfilters)
        .set(top("blockfilterindex"), when(filters.blockfilterindex, "basic"))
        .set_flag("peerblockfilters", filters.peerblockfilters);

    u
}

/// Validate `settings` and merge them into `conf`.
pub fn save_settings(conf: &ConfFile, settings: &NodeSettings) -> Result<Merged, SettingsError> {
    validate(settings)?;
    Ok(conf.merge(&to_updates(settings))?)
}
