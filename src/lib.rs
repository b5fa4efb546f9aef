// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod format;
pub mod inspector;
pub mod models;
pub mod prober;
pub mod redis_repo;
pub mod routes;
pub mod sampler;
pub mod snapshot_store;
pub mod version;
