//! bitcoind-wrapper: configuration and launch management for a bitcoind node
//!
//! The core is [`conf`], a line-preserving editor for `bitcoin.conf` that
//! reads selected keys and merges updates while leaving every unrelated line
//! byte-for-byte intact. [`settings`] maps a structured form onto it,
//! [`launch`] derives daemon arguments and [`health`] interprets
//! `bitcoin-cli` output.

pub mod cli;
pub mod conf;
pub mod config;
pub mod health;
pub mod launch;
pub mod settings;
