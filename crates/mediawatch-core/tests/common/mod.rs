#![allow(dead_code)]

pub mod head_server;
pub mod recorder;
