pub mod cache_gate;
pub mod orchestrator;
pub mod persister;
pub mod validator;
