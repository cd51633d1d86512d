//! Keeps a Postgres table of Tezos delegations in sync with the TzKT API.
//!
//! An [`scheduler::IntervalWorker`] drives [`sync::DelegationsClient::run_cycle`]
//! on a fixed interval; [`sync::HistoricSync`] loads whole years on demand.

pub mod config;
pub mod db;
pub mod models;
pub mod scheduler;
pub mod sync;
pub mod tzkt;
pub mod utils;

#[cfg(test)]
mod testkit;
