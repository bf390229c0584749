pub mod cache;
pub mod dashboard;
pub mod integrity;
pub mod normalizer;
pub mod record;
pub mod region;
pub mod statistics;
pub mod window;
