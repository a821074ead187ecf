//! cloudcmd – AWS service operations from the command line.
//!
//! Thin shell over `cloudcmd-core` adapters and the `cloudcmd-aws` service
//! client; all command semantics live in those crates.

pub mod commands;
