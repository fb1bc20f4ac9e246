pub mod api;
pub mod api_key;
pub mod data_source;
pub mod resolver;
pub mod snapshot;
pub mod starter;
pub mod table;
