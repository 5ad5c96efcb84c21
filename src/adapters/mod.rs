// Adapters layer: concrete implementations for external systems (storage, persistence, http).

pub mod http;
pub mod repository;
pub mod storage;
