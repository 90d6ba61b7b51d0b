pub mod auth;
pub mod config;
pub mod connect;
pub mod credentials;
pub mod documents;
pub mod firestore;
pub mod input;
pub mod rtdb;
pub mod store;
pub mod tree;

#[cfg(test)]
mod testing;
