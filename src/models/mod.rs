// src/models/mod.rs

pub mod exam_result;
pub mod scope;
pub mod standing;
pub mod student;
