/// 每个逻辑块的大小：4KB
/// 磁盘以“块”为最小读写单位，卷内所有结构都按块对齐。
pub const BLOCK_SIZE: usize = 4096;

/// 一个逻辑块的内存表示（4KB 字节数组）
pub type Block = [u8; BLOCK_SIZE];
