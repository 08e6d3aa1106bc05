pub mod completion_config;
