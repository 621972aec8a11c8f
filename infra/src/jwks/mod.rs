//! Remote JWKS key source
//!
//! Resource servers that do not share a process with the key manager fetch
//! the published JWKS document over HTTP. Caching, coalescing and stale
//! fallback live in `kg_core`'s key set cache; this source only fetches.

mod http_key_source;

#[cfg(test)]
mod tests;

pub use http_key_source::HttpKeySource;
