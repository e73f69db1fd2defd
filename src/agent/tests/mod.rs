//! Unit tests for tool selection and request orchestration.

mod support;
