pub mod activity;
pub mod database;
