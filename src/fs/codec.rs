//! 磁盘记录编解码。
//!
//! 卷内所有多字节整数一律小端。bincode 的默认配置（小端、定宽整数、
//! 无帧头）与磁盘格式逐字节一致，定宽记录的序列化因此直接交给
//! serde + bincode；记录按槽位编码，绝不跨越自己的槽。

use serde::{de::DeserializeOwned, Serialize};

use crate::disk::{Block, BLOCK_SIZE};
use crate::fs::error::{FsError, Result};

/// 把一条定宽记录编码进块内的指定槽位。
pub fn encode_record<T: Serialize>(record: &T, slot: &mut [u8]) -> Result<()> {
    let bytes = bincode::serialize(record).map_err(|_| FsError::CorruptBlock)?;
    if bytes.len() > slot.len() {
        return Err(FsError::CorruptBlock);
    }
    slot[..bytes.len()].copy_from_slice(&bytes);
    Ok(())
}

/// 从块内槽位解码一条定宽记录。
pub fn decode_record<T: DeserializeOwned>(slot: &[u8]) -> Result<T> {
    bincode::deserialize(slot).map_err(|_| FsError::CorruptBlock)
}

/// 编码单条记录并置于一个全零块的开头（超级块这类整块记录使用）。
pub fn record_to_block<T: Serialize>(record: &T) -> Result<Block> {
    let mut block = [0u8; BLOCK_SIZE];
    encode_record(record, &mut block)?;
    Ok(block)
}
