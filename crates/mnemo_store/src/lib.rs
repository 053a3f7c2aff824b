mod filter;
pub use filter::{Filter, FilterValue};

mod record;
pub use record::{Patch, SearchHit, StoreRecord};

mod vector_store;
pub use vector_store::VectorStore;

mod in_memory;
pub use in_memory::InMemoryVectorStore;
