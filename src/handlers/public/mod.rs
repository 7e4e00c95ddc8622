// handlers/public/mod.rs - endpoints that need no bearer token

pub mod drinks; // GET /drinks - summary listing
pub mod health; // GET /health - store connectivity

pub use drinks::list as drinks_list;
pub use health::health;
