// src/handlers/mod.rs

pub mod rankings;
pub mod results;
pub mod students;
