//! Shared fixtures for unit tests
//!
//! The `Acme` library is a small snapshot covering every rendering mode: a class with an
//! accessor pair, an enum with a keyword constant, an interface, out parameters, a foreign
//! base type and a nested namespace.


pub use acme::*;
