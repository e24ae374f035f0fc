pub mod config;
pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod db_operations;
pub mod errors;
pub mod grouping;
pub mod menu_fetcher;
pub mod ratings;
pub mod server;
pub mod shared_main;
pub mod task_scheduler_funcs;
pub mod url_meta;
