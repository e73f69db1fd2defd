//! Unit tests for server domain types and in-memory adapters.
