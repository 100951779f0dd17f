mod config_flow;
mod history;
mod screens;
mod session_flow;
