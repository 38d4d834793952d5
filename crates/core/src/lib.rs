#![forbid(unsafe_code)]

pub mod codec;
pub mod edit;
pub mod ids;
pub mod model;
pub mod phases;
