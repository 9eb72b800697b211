/// Artist name resolution.
///
/// Matches free-text artist names against the knowledge service in two
/// phases (exact label, then fuzzy similarity) and caches the outcome by
/// normalized name.
mod cache;
mod resolver;

pub use cache::{normalize_name, ResolutionCache};
pub use resolver::{similarity_ratio, ArtistResolver, ResolverSettings};
