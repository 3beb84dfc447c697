//! Unit tests for the plugin module.

mod domain_tests;
