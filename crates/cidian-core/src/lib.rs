pub mod batch;
pub mod dictionary;
pub mod lookup;
pub mod memory;
pub mod present;
pub mod preprocess;
pub mod query;

pub use batch::ResultBatch;
pub use dictionary::{CorrectionOracle, Entry, LookupStore, StoreError, Suggestion};
pub use lookup::{LookupEngine, LookupError, LookupOptions, UpdateSink};
pub use memory::MemoryStore;
pub use query::{Classified, Query, RetrievalMode, classify};
