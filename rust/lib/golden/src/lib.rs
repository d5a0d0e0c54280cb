//! Catalog golden tests.
//!
//! Structure:
//! - `server/`: reference backend (axum + JWT over a KVStore)
//! - `client_test`: the client against a live backend over HTTP
//! - `bff_test`: view state driven by intents, end to end

pub mod server;

#[cfg(test)]
mod support;

#[cfg(test)]
mod client_test;

#[cfg(test)]
mod bff_test;
