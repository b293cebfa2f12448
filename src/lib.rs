//! # unv
//!
//! A transpiler for unv, an indentation-delimited scripting syntax, into JavaScript.
//!
//! The interesting part is the line-oriented transform in [`unv::transpiling`]. The rest
//! of the crate is the playground around it: a compile stage, an execute stage backed by
//! `node`, a runtime context, a latest-wins session and URL-fragment persistence.
//!
//! ## Testing
//!
//! Sample programs and brace-balance helpers shared by the test suites live in the
//! [testing module](unv::testing).

pub mod unv;
