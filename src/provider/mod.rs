// Movie Data Adapter. Talks to the external read-only movie provider and
// normalizes its response shape into the crate's `Movie` model at this single
// boundary.
//
// Known limitation: the provider has no popularity endpoint, so the "popular"
// listing is approximated by a fixed set of topical searches, taking the first
// hit of each. That yields a small diverse sample, not a true ranking.

pub mod catalog;
pub mod omdb;

pub use catalog::MovieCatalog;
pub use omdb::OmdbClient;
