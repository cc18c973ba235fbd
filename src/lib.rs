// src/lib.rs
//! Demo presentation shared by the `tableau` and `tableau-debug` binaries.

pub mod demo;

pub use demo::*;
