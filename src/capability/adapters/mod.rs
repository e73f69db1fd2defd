//! Adapter implementations of the capability ports.

pub mod builtin;

pub use builtin::register_builtin_tools;
