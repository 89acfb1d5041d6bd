use serde::{Deserialize, Serialize};

use crate::disk::{Block, BlockDevice, BLOCK_SIZE};
use crate::fs::codec;
use crate::fs::config::{
    INODES_PER_BLOCK, INODE_SIZE, INODE_TABLE_START_BLOCK_ID, POINTERS_PER_BLOCK,
    POINTERS_PER_INODE,
};
use crate::fs::error::{FsError, Result};

/// 磁盘上的 inode：32 字节定宽记录。
/// 全局编号规则：(块序号 - 1) × 128 + 槽位。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inode {
    pub valid: u32,                        // 1 = 已分配，0 = 空闲
    pub size: u32,                         // 文件长度（字节）
    pub direct: [u32; POINTERS_PER_INODE], // 直接指针，0 表示未设置
    pub indirect: u32,                     // 间接块号，0 表示没有
}

impl Inode {
    pub fn is_valid(&self) -> bool {
        self.valid == 1
    }
}

/// 一个 inode 块：128 条 inode 记录首尾相接，正好填满 4KB。
#[derive(Debug, Clone)]
pub struct InodeBlock {
    pub inodes: Vec<Inode>, // 长度固定为 INODES_PER_BLOCK
}

impl InodeBlock {
    pub fn decode(buf: &Block) -> Result<Self> {
        let inodes = buf
            .chunks_exact(INODE_SIZE)
            .map(|slot| codec::decode_record::<Inode>(slot))
            .collect::<Result<Vec<Inode>>>()?;
        Ok(Self { inodes })
    }

    pub fn encode(&self) -> Result<Block> {
        let mut block = [0u8; BLOCK_SIZE];
        for (slot, inode) in self.inodes.iter().enumerate() {
            codec::encode_record(inode, &mut block[slot * INODE_SIZE..(slot + 1) * INODE_SIZE])?;
        }
        Ok(block)
    }
}

/// 间接块：1024 个 32 位数据块指针，0 表示空槽。
#[derive(Debug, Clone)]
pub struct IndirectBlock {
    pub pointers: Vec<u32>, // 长度固定为 POINTERS_PER_BLOCK
}

impl IndirectBlock {
    pub fn zeroed() -> Self {
        Self {
            pointers: vec![0; POINTERS_PER_BLOCK],
        }
    }

    pub fn decode(buf: &Block) -> Result<Self> {
        let pointers = buf
            .chunks_exact(4)
            .map(|slot| codec::decode_record::<u32>(slot))
            .collect::<Result<Vec<u32>>>()?;
        Ok(Self { pointers })
    }

    pub fn encode(&self) -> Result<Block> {
        let mut block = [0u8; BLOCK_SIZE];
        for (slot, ptr) in self.pointers.iter().enumerate() {
            codec::encode_record(ptr, &mut block[slot * 4..(slot + 1) * 4])?;
        }
        Ok(block)
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        self.pointers.iter().position(|&p| p == 0)
    }

    pub fn is_full(&self) -> bool {
        self.pointers.iter().all(|&p| p != 0)
    }
}

/// 挂载期间驻留内存的 inode 表。
/// 每个 inode 块按块序号持有一份解码后的独立副本，
/// 修改任何 inode 都会把所在的块整块写回磁盘。
#[derive(Debug)]
pub struct InodeTable {
    blocks: Vec<InodeBlock>, // blocks[k] 对应磁盘上的 k+1 号块
}

impl InodeTable {
    /// 从磁盘读入全部 inode 块。
    pub fn load<D: BlockDevice>(device: &D, inode_blocks: u32) -> Result<Self> {
        let mut blocks = Vec::with_capacity(inode_blocks as usize);
        let mut buf: Block = [0u8; BLOCK_SIZE];
        for ordinal in INODE_TABLE_START_BLOCK_ID..=inode_blocks {
            device.read_block(ordinal, &mut buf)?;
            blocks.push(InodeBlock::decode(&buf)?);
        }
        Ok(Self { blocks })
    }

    /// inode 号 → (块序号, 块内槽位)
    pub fn find(&self, inumber: u32) -> Result<(u32, usize)> {
        let ordinal = inumber / INODES_PER_BLOCK + 1;
        if ordinal > self.blocks.len() as u32 {
            return Err(FsError::OutOfRange(inumber));
        }
        Ok((ordinal, (inumber % INODES_PER_BLOCK) as usize))
    }

    pub fn get(&self, inumber: u32) -> Result<Inode> {
        let (ordinal, slot) = self.find(inumber)?;
        Ok(self.blocks[(ordinal - 1) as usize].inodes[slot])
    }

    /// 更新内存副本并把所在的 inode 块整块写回。
    pub fn store<D: BlockDevice>(&mut self, device: &D, inumber: u32, inode: Inode) -> Result<()> {
        let (ordinal, slot) = self.find(inumber)?;
        let block = &mut self.blocks[(ordinal - 1) as usize];
        block.inodes[slot] = inode;
        device.write_block(ordinal, &block.encode()?)?;
        Ok(())
    }

    /// 按 inode 号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Inode)> {
        self.blocks
            .iter()
            .flat_map(|b| b.inodes.iter())
            .enumerate()
            .map(|(i, inode)| (i as u32, inode))
    }
}
