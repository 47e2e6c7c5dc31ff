//! # Reconciler Ports
//!
//! Outbound traits for the chain-facing collaborators.

pub mod outbound;

pub use outbound::{
    ContractGateway, GatewayError, MockRegistryReader, ReaderError, RegistryReader,
};
