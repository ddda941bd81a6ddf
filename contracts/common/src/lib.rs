//! Shared arithmetic and cross-contract security invariant tests for the
//! Digital Giant settlement contracts.

#![cfg_attr(not(test), no_std)]

pub mod bps;
