pub mod block_device;
pub mod file_disk;
#[cfg(test)]
pub mod mem_disk;
pub mod types;

// 对外导出常用类型，便于上层使用
pub use block_device::BlockDevice;
pub use file_disk::FileDisk;
#[cfg(test)]
pub use mem_disk::MemDisk;
pub use types::{Block, BLOCK_SIZE};
