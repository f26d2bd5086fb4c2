//! The filter contract shared by every software filter, and the registry of built-ins.

/// Capability, lifecycle and dispatch traits.
pub mod contract;
/// Per-frame work units and packets.
pub mod packet;
/// Built-in filter lookup.
pub mod registry;
