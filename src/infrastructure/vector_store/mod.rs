mod collection;
mod in_memory;
mod on_disk;

pub use in_memory::InMemoryVectorStore;
pub use on_disk::OnDiskVectorStore;
