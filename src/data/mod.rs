//! Data module - dataset loading, validation and cleaning

mod loader;
mod processor;
mod table;

pub use loader::{DataLoader, DataSource, LoaderError};
pub use processor::{ColumnInfo, DataProcessor, ProcessorError};
pub use table::{Feature, RecordTable, Species, TableError, SPECIES_COLUMN};
