//! Backhaul - control plane for managed backup jobs
//!
//! This library provides the core functionality of the Backhaul control
//! plane. It exposes all modules for testing purposes.

pub mod dataset;
pub mod entities;
pub mod errors;
pub mod naming;
pub mod registration;
pub mod resolvers;
pub mod schedule;
pub mod settings;
pub mod storage;
pub mod web;
