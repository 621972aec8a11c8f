//! Credential stores held in memory
//!
//! Built once at startup from the configured registrations. Secrets and
//! passwords are stored as the bcrypt hashes given in configuration.

mod client_repository;
mod owner_repository;


pub use client_repository::InMemoryClientRepository;
pub use owner_repository::InMemoryResourceOwnerRepository;
