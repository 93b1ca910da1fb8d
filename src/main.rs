mod app;
mod audio;
mod command;
mod config;
mod descriptor;
mod library;
mod mpris;
mod resolver;
mod runtime;
mod session;
mod store;
mod ui;

fn main() {
    if let Err(e) = runtime::run() {
        eprintln!("reprise: {e}");
        std::process::exit(1);
    }
}
