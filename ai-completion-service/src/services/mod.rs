pub mod azure_open_ai_service;
