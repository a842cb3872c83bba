// src/services/mod.rs

pub mod score_recorder;
