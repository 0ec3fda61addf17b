#![doc = "issues-exporter: export pipeline turning tracker issues into PDF reports."]

//! This crate contains the full export pipeline: concurrent issue and
//! repository acquisition, report model building, render orchestration,
//! diagnostic archiving on failure and artifact download resolution.
//! The issue tracker and the rendering API are consumed through the traits in
//! [`contract`]; HTTP implementations for both live in [`tracker`] and
//! [`render_client`].

pub mod cli;
pub mod config;
pub mod contract;
pub mod diagnostics;
pub mod download;
pub mod error;
pub mod export;
pub mod fetch;
pub mod load_config;
pub mod render;
pub mod render_client;
pub mod report_model;
pub mod tracker;
