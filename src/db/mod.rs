pub mod db;
pub mod memorydb;
pub mod propertydb;
pub mod seed;
pub mod tokenizationdb;

use propertydb::PropertyExt;
use tokenizationdb::TokenizationExt;

/// Everything the API needs from persistence.
pub trait Store: PropertyExt + TokenizationExt + Send + Sync {}

impl<T> Store for T where T: PropertyExt + TokenizationExt + Send + Sync {}
