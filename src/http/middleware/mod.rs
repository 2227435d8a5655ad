//! Request middleware.

pub mod origin_gate;

pub use origin_gate::origin_gate;
