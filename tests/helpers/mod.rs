#![allow(dead_code)]

pub use assert::*;
pub use files::*;
pub use server::*;

mod assert;
mod files;
mod server;
