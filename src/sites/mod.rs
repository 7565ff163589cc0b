//! Site-specific extractors
//!
//! Each supported site provides an [`Extractor`](crate::crawler::Extractor)
//! implementation and a way to build its search page template.

mod startribune;

pub use startribune::StarTribune;
