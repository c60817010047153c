pub mod config;
pub mod controllers;
pub mod db;
pub mod models;
pub mod routers;
pub mod store;
