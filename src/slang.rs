//! Main module for slang library functionality

pub mod drivers;
pub mod engine;
pub mod extension;
pub mod keywords;
pub mod mapping;
pub mod normalize;
pub mod patterns;
pub mod segments;
pub mod settings;
pub mod transforms;
