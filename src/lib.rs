//! Pick a host from an ansible inventory and open an ssh session to it.
//!
//! The pipeline is three steps: [`inventory::fetcher`] runs
//! `ansible-inventory --list`, [`table`] (or the full-screen [`tui`]) presents
//! the hosts, and [`connection`] hands the chosen one to `ssh`.

pub mod app;
pub mod config;
pub mod connection;
pub mod event;
pub mod handler;
pub mod inventory;
pub mod selection;
pub mod table;
pub mod tui;
pub mod ui;
