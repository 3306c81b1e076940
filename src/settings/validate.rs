//! Validation of settings before they are written

use super::{NodeSettings, Peer, Pruning, SettingsError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid regex"));

static RPCAUTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+:([0-9a-fA-F]{2})+\$([0-9a-fA-F]{2})+$").expect("valid regex")
});

static ONION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z2-7]{16}|[a-z2-7]{56})\.onion$").expect("valid regex"));

static DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9][a-z0-9-]{0,61}[a-z0-9]$")
        .expect("valid regex")
});

pub(crate) fn check_range<T>(field: &str, value: T, min: T, max: Option<T>) -> Result<(), SettingsError>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min {
        return Err(SettingsError::invalid(field, format!("{} is below the minimum of {}", value, min)));
    }
    if let Some(max) = max {
        if value > max {
            return Err(SettingsError::invalid(
                field,
                format!("{} is above the maximum of {}", value, max),
            ));
        }
    }
    Ok(())
}

fn check_peer(peer: &Peer) -> Result<(), SettingsError> {
    let host = peer.hostname.as_str();
    let ok = host.parse::<IpAddr>().is_ok() || ONION.is_match(host) || DOMAIN.is_match(host);
    if !ok {
        return Err(SettingsError::invalid(
            "advanced.peers.addnode",
            format!("'{}' is not a domain name, IPv4/IPv6 address or onion address", host),
        ));
    }
    Ok(())
}

/// Check every field of `settings`, stopping at the first problem.
pub fn validate(settings: &NodeSettings) -> Result<(), SettingsError> {
    let rpc = &settings.rpc;
    if !USERNAME.is_match(&rpc.username) {
        return Err(SettingsError::invalid(
            "rpc.username",
            "must be alphanumeric (can contain underscore)",
        ));
    }
    if let Some(password) = &rpc.password {
        if password.is_empty() || password.contains(['\n', '\r']) {
            return Err(SettingsError::invalid("rpc.password", "must be a single non-empty line"));
        }
    }
    for auth in &rpc.advanced.auth {
        if !RPCAUTH.is_match(auth) {
            return Err(SettingsError::invalid(
                "rpc.advanced.auth",
                format!("'{}' is not of the form <USERNAME>:<SALT>$<HASH>", auth),
            ));
        }
    }
    check_range("rpc.advanced.servertimeout", rpc.advanced.servertimeout, 5, Some(300))?;
    check_range("rpc.advanced.threads", rpc.advanced.threads, 1, Some(64))?;
    check_range("rpc.advanced.workqueue", rpc.advanced.workqueue, 8, Some(256))?;

    let fee = settings.wallet.discardfee;
    if !fee.is_finite() {
        return Err(SettingsError::invalid("wallet.discardfee", "must be a number"));
    }
    check_range("wallet.discardfee", fee, 0.0, Some(0.01))?;

    let advanced = &settings.advanced;
    check_range("advanced.mempool.maxmempool", advanced.mempool.maxmempool, 1, None)?;
    check_range("advanced.mempool.mempoolexpiry", advanced.mempool.mempoolexpiry, 1, None)?;
    for peer in &advanced.peers.addnode {
        check_peer(peer)?;
    }
    if let Pruning::Automatic { size } = advanced.pruning {
        check_range("advanced.pruning.size", size, 550, Some(1_000_000))?;
    }
    if advanced.blockfilters.peerblockfilters && !advanced.blockfilters.blockfilterindex {
        return Err(SettingsError::invalid(
            "advanced.blockfilters.peerblockfilters",
            "requires blockfilterindex",
        ));
    }

    Ok(())
}
