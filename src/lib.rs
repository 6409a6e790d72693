pub mod api;
pub mod app;
pub mod auth;
pub mod cloudant;
pub mod components;
pub mod config;
pub mod db;
pub mod flow;
pub mod models;
pub mod nlu;
pub mod utils;
