/// 超级块魔数，用于识别卷
pub const MAGIC_NUMBER: u32 = 0xF0F0_3410;

/// 超级块固定占据 0 号块
pub const SUPER_BLOCK_ID: u32 = 0;

/// inode 表紧跟超级块，从 1 号块开始连续存放
pub const INODE_TABLE_START_BLOCK_ID: u32 = 1;

/// 每个 inode 在磁盘上占 32 字节，一个 4KB 块正好放 128 个
pub const INODE_SIZE: usize = 32;
pub const INODES_PER_BLOCK: u32 = 128;

/// 每个 inode 内置 5 个直接指针
pub const POINTERS_PER_INODE: usize = 5;

/// 一个间接块容纳 1024 个 32 位块指针
pub const POINTERS_PER_BLOCK: usize = 1024;

/// 单个文件的容量上限（数据块数）：直接指针 + 一个间接块
pub const MAX_FILE_BLOCKS: usize = POINTERS_PER_INODE + POINTERS_PER_BLOCK;
