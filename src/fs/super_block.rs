use serde::{Deserialize, Serialize};

use crate::disk::{BlockDevice, BLOCK_SIZE};
use crate::fs::codec;
use crate::fs::config::{MAGIC_NUMBER, SUPER_BLOCK_ID};
use crate::fs::error::{FsError, Result};

/// 超级块：卷的根描述符，固定存放在 0 号块。
/// 格式化时写入一次，此后不再改动。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperBlock {
    pub magic_number: u32, // 文件系统魔数
    pub blocks: u32,       // 卷内总块数
    pub inode_blocks: u32, // 为 inode 表保留的块数
    pub inodes: u32,       // inode 计数，仅供参考，可保持为 0
}

impl SuperBlock {
    /// 为 nblocks 大小的新卷生成超级块。
    /// inode 表约占总块数的 10%，四舍五入（0.5 远离零进位），
    /// 至少 1 块、至多 nblocks - 1 块。
    /// 卷至少要放得下超级块和一个 inode 块，更小的设备直接拒绝。
    pub fn for_volume(nblocks: u32) -> Result<Self> {
        if nblocks < 2 {
            return Err(FsError::NoSpace);
        }
        let inode_blocks = ((nblocks as f64 * 0.1).round() as u32).clamp(1, nblocks - 1);
        Ok(Self {
            magic_number: MAGIC_NUMBER,
            blocks: nblocks,
            inode_blocks,
            inodes: 0,
        })
    }

    /// 数据区的起始块号（inode 表之后的第一块）
    pub fn data_start(&self) -> u32 {
        self.inode_blocks + 1
    }

    pub fn magic_valid(&self) -> bool {
        self.magic_number == MAGIC_NUMBER
    }
}

/// 读出 0 号块并校验魔数，挂载路径使用。
pub fn load<D: BlockDevice>(device: &D) -> Result<SuperBlock> {
    let sb = load_unchecked(device)?;
    if !sb.magic_valid() {
        return Err(FsError::BadMagic(sb.magic_number));
    }
    Ok(sb)
}

/// 读出 0 号块但不校验魔数；debug 转储会容忍坏魔数。
pub fn load_unchecked<D: BlockDevice>(device: &D) -> Result<SuperBlock> {
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(SUPER_BLOCK_ID, &mut buf)?;
    codec::decode_record(&buf)
}

/// 把超级块写入 0 号块，剩余字节全部为零。
pub fn store<D: BlockDevice>(device: &D, sb: &SuperBlock) -> Result<()> {
    let block = codec::record_to_block(sb)?;
    device.write_block(SUPER_BLOCK_ID, &block)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::MemDisk;

    #[test]
    fn inode_region_sizing_follows_ten_percent_rule() {
        assert_eq!(SuperBlock::for_volume(10).unwrap().inode_blocks, 1);
        assert_eq!(SuperBlock::for_volume(5).unwrap().inode_blocks, 1); // 0.5 远离零进位
        assert_eq!(SuperBlock::for_volume(25).unwrap().inode_blocks, 3); // 2.5 同理
        assert_eq!(SuperBlock::for_volume(200).unwrap().inode_blocks, 20);
        assert_eq!(SuperBlock::for_volume(2).unwrap().inode_blocks, 1); // 下限为 1
    }

    #[test]
    fn for_volume_rejects_undersized_devices() {
        assert!(matches!(SuperBlock::for_volume(0), Err(FsError::NoSpace)));
        assert!(matches!(SuperBlock::for_volume(1), Err(FsError::NoSpace)));
    }

    #[test]
    fn superblock_round_trips_through_block_zero() {
        let disk = MemDisk::new(4);
        let sb = SuperBlock::for_volume(4).unwrap();
        store(&disk, &sb).unwrap();
        assert_eq!(load(&disk).unwrap(), sb);
    }

    #[test]
    fn superblock_encoding_is_little_endian() {
        let disk = MemDisk::new(4);
        store(&disk, &SuperBlock::for_volume(4).unwrap()).unwrap();

        let mut block = [0u8; BLOCK_SIZE];
        disk.read_block(0, &mut block).unwrap();
        assert_eq!(&block[..4], &[0x10, 0x34, 0xF0, 0xF0]); // 0xF0F03410 的小端字节序
        assert_eq!(&block[4..8], &[4, 0, 0, 0]);
        assert!(block[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn load_rejects_bad_magic_but_unchecked_tolerates_it() {
        let disk = MemDisk::new(4);
        assert!(matches!(load(&disk), Err(FsError::BadMagic(0))));
        assert!(!load_unchecked(&disk).unwrap().magic_valid());
    }
}
