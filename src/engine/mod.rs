//! Engine module for aspect-based sentiment annotation
//!
//! This module is organized into the following submodules:
//! - `constants`: Pipeline defaults and label sets
//! - `config`: Pipeline configuration loaded from YAML
//! - `components`: The annotation stages
//! - `core`: Core AspectSentimentEngine struct and constructor
//! - `execution`: Text, document and batch entry points

pub mod components;
pub mod config;
pub mod constants;
pub mod core;
pub mod execution;


pub use config::PipelineConfig;
pub use constants::*;
pub use core::AspectSentimentEngine;
