#![allow(non_snake_case)]

pub mod inspection;
pub mod utils;
pub mod web;
