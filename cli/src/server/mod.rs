mod hyper_server;
mod services;

pub use hyper_server::start_server;
