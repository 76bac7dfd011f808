use dioxus_logger::tracing::Level;

mod app;
mod components;
mod state;
mod utils;

fn main() {
    dioxus_logger::init(Level::INFO).expect("failed to init logger");
    dioxus::launch(app::App);
}
