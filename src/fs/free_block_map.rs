use crate::disk::{Block, BlockDevice, BLOCK_SIZE};
use crate::fs::error::{FsError, Result};
use crate::fs::inode_table::{IndirectBlock, InodeTable};

/// 空闲块表：每块一位，1 = 已用，0 = 空闲。
/// 只存在于内存中，挂载时依据超级块和 inode 表扫描重建，从不落盘。
#[derive(Debug)]
pub struct FreeBlockMap {
    bits: Vec<u8>,     // 位图数据
    total_blocks: u32, // 卷内总块数
    free_blocks: u32,  // 当前空闲块数
    data_start: u32,   // 数据区起始块号，分配从这里开始扫描
}

impl FreeBlockMap {
    /// 建立一张空表并把超级块和 inode 表区间标记为已用。
    fn with_reserved(total_blocks: u32, data_start: u32) -> Result<Self> {
        if data_start > total_blocks {
            return Err(FsError::OutOfRange(data_start));
        }
        let byte_len = (total_blocks as usize + 7) / 8;
        let mut map = Self {
            bits: vec![0; byte_len],
            total_blocks,
            free_blocks: total_blocks,
            data_start,
        };
        for block_id in 0..data_start {
            map.mark_used(block_id)?;
        }
        Ok(map)
    }

    pub fn is_used(&self, block_id: u32) -> bool {
        let byte_index = (block_id / 8) as usize;
        let bit_index = block_id % 8;
        self.bits[byte_index] & (1 << bit_index) != 0
    }

    /// 标记一个块为已用；重复标记不影响计数。
    pub fn mark_used(&mut self, block_id: u32) -> Result<()> {
        if block_id >= self.total_blocks {
            return Err(FsError::OutOfRange(block_id));
        }
        let byte_index = (block_id / 8) as usize;
        let bit_index = block_id % 8;
        if self.bits[byte_index] & (1 << bit_index) == 0 {
            self.bits[byte_index] |= 1 << bit_index;
            self.free_blocks -= 1;
        }
        Ok(())
    }

    /// 归还一个块；重复释放同样被忽略。
    pub fn release(&mut self, block_id: u32) -> Result<()> {
        if block_id >= self.total_blocks {
            return Err(FsError::OutOfRange(block_id));
        }
        let byte_index = (block_id / 8) as usize;
        let bit_index = block_id % 8;
        if self.bits[byte_index] & (1 << bit_index) != 0 {
            self.bits[byte_index] &= !(1 << bit_index);
            self.free_blocks += 1;
        }
        Ok(())
    }

    /// 从数据区起点向后找第一个空闲块，标记为已用并返回块号。
    /// 立即标记保证同一次操作内的多次分配互不重复。
    pub fn alloc(&mut self) -> Result<u32> {
        for block_id in self.data_start..self.total_blocks {
            if !self.is_used(block_id) {
                self.mark_used(block_id)?;
                return Ok(block_id);
            }
        }
        Err(FsError::NoSpace)
    }

    pub fn free_blocks(&self) -> u32 {
        self.free_blocks
    }

    /// 以 0/1 序列导出整张表，debug 转储打印使用。
    pub fn snapshot(&self) -> Vec<u32> {
        (0..self.total_blocks).map(|b| self.is_used(b) as u32).collect()
    }

    /// 依据 inode 表扫描重建整张表（挂载与 debug 共用）。
    /// 合法 inode 的直接指针、间接块以及间接块内解码出的
    /// 每个非零指针都计为已用；其余一律空闲。
    /// total_blocks 由调用方给出：挂载用校验过的超级块块数，
    /// debug 用设备实际大小，坏超级块也能照常出报告。
    pub fn rebuild<D: BlockDevice>(
        device: &D,
        total_blocks: u32,
        data_start: u32,
        table: &InodeTable,
    ) -> Result<Self> {
        let mut map = Self::with_reserved(total_blocks, data_start)?;
        let mut buf: Block = [0u8; BLOCK_SIZE];

        for (_, inode) in table.iter() {
            if !inode.is_valid() || inode.size == 0 {
                continue;
            }
            for &ptr in inode.direct.iter() {
                if ptr != 0 {
                    map.mark_used(ptr)?;
                }
            }
            if inode.indirect != 0 {
                map.mark_used(inode.indirect)?;
                device.read_block(inode.indirect, &mut buf)?;
                let iblock = IndirectBlock::decode(&buf)?;
                for &ptr in iblock.pointers.iter() {
                    if ptr != 0 {
                        map.mark_used(ptr)?;
                    }
                }
            }
        }
        Ok(map)
    }
}
