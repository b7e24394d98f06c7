//! Archflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by every stage of the
//! Archflow pipeline. It includes:
//!
//! - **Identifiers**: String-interned entity names ([`identifier::Id`])
//! - **Policies**: Named conflict-resolution policies ([`policy::ConflictPolicy`])
//! - **Semantic**: The resolved architecture model ([`semantic`] module)

pub mod identifier;
pub mod policy;
pub mod semantic;
