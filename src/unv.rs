//! Main module for unv library functionality
//!
//!     source text
//!         -> lexing::scrub                 (comments out, string interiors neutralized)
//!         -> transpiling::transpile_with   (classify, rewrite, track indentation, emit)
//!         -> pipeline::Compiler            (syntax extensions, delimiter validation)
//!         -> pipeline::Executor            (runs the unit against a RuntimeContext)
//!
//! [`session`] ties the stages together for a host and funnels every failure into the
//! run log.

pub mod config;
pub mod fragment;
pub mod lexing;
pub mod pipeline;
pub mod runtime;
pub mod session;
pub mod testing;
pub mod transpiling;

pub use transpiling::{transpile, transpile_with, TranspileOptions};
