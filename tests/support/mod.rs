#![allow(dead_code)]

pub mod calls;
pub mod manifest;
