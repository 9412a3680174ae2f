pub mod analysis;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod control;
pub mod cookies;
pub mod db;
pub mod i18n;
pub mod sensors;
pub mod state;
pub mod store;
pub mod web;
