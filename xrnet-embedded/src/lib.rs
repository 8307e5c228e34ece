#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
pub mod network;
pub mod provision;
pub mod sysinfo;

pub use error::*;
pub use network::*;
pub use provision::*;
pub use sysinfo::*;
