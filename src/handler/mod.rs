pub mod deployment;
pub mod documents;
pub mod properties;
pub mod tokenization;
