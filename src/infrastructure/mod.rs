pub mod in_memory;
pub mod mock_aggregator;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
