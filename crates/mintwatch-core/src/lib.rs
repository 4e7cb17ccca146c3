//! Core domain types for the mintwatch token scanner.
//!
//! This crate provides the fundamental types shared across the system:
//! - `TokenRecord`: one enriched record per distinct mint
//! - `PricePoint`: a single (timestamp, price) sample
//! - `CreatorInfo`: off-chain creator metadata

pub mod token;

pub use token::{CreatorInfo, PricePoint, TokenRecord};
