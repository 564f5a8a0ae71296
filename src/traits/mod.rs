//! Core traits for provider resolution.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
