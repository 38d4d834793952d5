#![forbid(unsafe_code)]

pub(crate) mod ai;
pub(crate) mod args;
pub(crate) mod build_info;
pub(crate) mod jsonrpc;
pub(crate) mod time;
