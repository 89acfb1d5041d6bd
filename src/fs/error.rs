use std::fmt;

/// 文件系统错误类型
#[derive(Debug)]
pub enum FsError {
    Device(std::io::Error), // 底层块 I/O 错误
    BadMagic(u32),          // 超级块魔数不匹配，携带实际读到的值
    CorruptBlock,           // 块内容无法按预期的记录解码
    OutOfRange(u32),        // inode 号或块号超出卷的范围
    NotFound(u32),          // inode 槽位未分配
    NoFreeInode,            // inode 表已满
    NoSpace,                // 没有空闲数据块
    FileTooLarge,           // 超出直接 + 间接指针的容量
    OversizedWrite(usize),  // 单次写入超过一个块
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        FsError::Device(e)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "disk I/O error: {}", e),
            Self::BadMagic(m) => write!(f, "bad magic number 0x{:08x} in superblock", m),
            Self::CorruptBlock => write!(f, "block contents could not be decoded"),
            Self::OutOfRange(n) => write!(f, "index {} is out of range", n),
            Self::NotFound(n) => write!(f, "inode {} is not valid", n),
            Self::NoFreeInode => write!(f, "no free inode available"),
            Self::NoSpace => write!(f, "no free data block available"),
            Self::FileTooLarge => write!(f, "file reached its maximum size"),
            Self::OversizedWrite(n) => write!(f, "write of {} bytes exceeds block size", n),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device(e) => Some(e),
            _ => None,
        }
    }
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FsError>;
