//! Unit tests for the capability registry, finder and built-in tools.

mod builtin_tests;
mod support;
