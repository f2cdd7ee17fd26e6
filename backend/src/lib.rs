pub mod config;
pub mod drive;
pub mod errors;
pub mod fechas;
pub mod formlink;
pub mod job_controller;
pub mod pdf;
pub mod services;
pub mod sheets;
pub mod shortener;
