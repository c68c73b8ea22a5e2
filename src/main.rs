mod account;
mod admin;
mod api;
mod components;
mod config;
mod controller;
mod db;
mod diagnostics;
mod error;
mod player;
mod session;

use components::App;
use config::ClientConfig;

fn main() {
    diagnostics::init_logging(&ClientConfig::from_env());
    dioxus::launch(App);
}
