#![no_std]

pub mod fractional_property;
pub mod property_registry;

pub use fractional_property::{FractionalProperty, FractionalPropertyClient};
pub use property_registry::{PropertyRegistry, PropertyRegistryClient};

/// Basis-point denominator shared by both contracts.
pub const BPS_DENOMINATOR: u32 = 10_000;
