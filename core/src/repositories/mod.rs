pub mod client;
pub mod owner;

pub use client::ClientRepository;
pub use owner::ResourceOwnerRepository;

#[cfg(test)]
pub use client::MockClientRepository;
#[cfg(test)]
pub use owner::MockResourceOwnerRepository;
