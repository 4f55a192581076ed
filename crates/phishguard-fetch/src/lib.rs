//! Reference corpus retrieval: the fixed, pre-labelled dataset every training
//! run starts from.

pub mod reference;

pub use reference::{FetchError, ReferenceClient, ReferenceData, parse_tsv};
