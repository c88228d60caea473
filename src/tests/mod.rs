mod common;
mod export_driver;
