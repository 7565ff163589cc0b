//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run the StarTribune
//! extractor end-to-end over real HTTP.

mod harvest_tests;
