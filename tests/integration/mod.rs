//! Shared fixtures for integration tests against a mock HTTP server

pub mod mock_server;
