//! HTTP request handlers, one module per surface area.

pub mod chat;
pub mod engine_proxy;
pub mod gallery;
pub mod generate;
pub mod media;
pub mod media_data;
pub mod models;
pub mod tts;
pub mod voices;
