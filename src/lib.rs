pub mod commands;
pub mod compose;
pub mod config;
pub mod web;
