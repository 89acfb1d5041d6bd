use std::io::Write;
use std::sync::Arc;

use log::debug;

use crate::disk::{Block, BlockDevice, BLOCK_SIZE};
use crate::fs::free_block_map::FreeBlockMap;
use crate::fs::inode_table::{IndirectBlock, Inode, InodeTable};
use crate::fs::super_block::SuperBlock;

pub mod codec;
pub mod config;
pub mod error;
pub mod free_block_map;
pub mod inode_table;
pub mod super_block;

pub use error::{FsError, Result};

/// 一次挂载的卷。
/// 设备句柄、超级块快照、inode 表副本和空闲块表全部由这个值独占持有，
/// unmount 把它消耗掉，内存状态随之销毁；重新挂载会从磁盘重建一切。
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
    super_block: SuperBlock,
    inode_table: InodeTable,
    free_map: FreeBlockMap,
}

impl<D: BlockDevice> FileSystem<D> {
    /// 在设备上建立一个空卷：写入新超级块，清零 inode 区和数据区。
    /// 格式化不建立内存状态，之后需要 mount。
    pub fn format(device: &D) -> Result<()> {
        Self::format_with(device, |_, _| {})
    }

    /// 同 format，但每写完一个块回调一次 (已完成, 总数)，供进度条使用。
    pub fn format_with(device: &D, mut progress: impl FnMut(u32, u32)) -> Result<()> {
        let nblocks = device.size();
        let sb = SuperBlock::for_volume(nblocks)?;
        super_block::store(device, &sb)?;
        progress(1, nblocks);

        // inode 区和数据区全部清零
        let zero = [0u8; BLOCK_SIZE];
        for block_id in 1..nblocks {
            device.write_block(block_id, &zero)?;
            progress(block_id + 1, nblocks);
        }

        debug!(
            "formatted volume: {} blocks, {} inode blocks",
            sb.blocks, sb.inode_blocks
        );
        Ok(())
    }

    /// 挂载：读超级块（坏魔数直接失败）、载入全部 inode 块、
    /// 扫描重建空闲块表，最后递增设备的挂载计数。
    pub fn mount(device: Arc<D>) -> Result<Self> {
        let sb = super_block::load(device.as_ref())?;
        let inode_table = InodeTable::load(device.as_ref(), sb.inode_blocks)?;
        let free_map =
            FreeBlockMap::rebuild(device.as_ref(), sb.blocks, sb.data_start(), &inode_table)?;
        device.mount();

        debug!(
            "mounted volume: {} blocks, {} inode blocks, {} free",
            sb.blocks,
            sb.inode_blocks,
            free_map.free_blocks()
        );
        Ok(Self {
            device,
            super_block: sb,
            inode_table,
            free_map,
        })
    }

    /// 卸载：递减设备挂载计数并丢弃全部内存状态。
    pub fn unmount(self) {
        self.device.unmount();
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }

    /// 按 inode 号升序找第一个空闲槽位并激活它。
    /// 0 号 inode 永远保留不分配，保证指针值 0 始终表示“未设置”。
    pub fn create(&mut self) -> Result<u32> {
        let chosen = self
            .inode_table
            .iter()
            .find(|(inumber, inode)| *inumber > 0 && !inode.is_valid())
            .map(|(inumber, _)| inumber);
        let inumber = chosen.ok_or(FsError::NoFreeInode)?;

        let inode = Inode {
            valid: 1,
            ..Inode::default()
        };
        self.inode_table
            .store(self.device.as_ref(), inumber, inode)?;
        Ok(inumber)
    }

    /// 合法 inode 的文件大小（字节）。
    pub fn stat(&self, inumber: u32) -> Result<u32> {
        Ok(self.read(inumber)?.size)
    }

    /// 取出 inode 描述符，调用方可据此自行遍历数据块。
    pub fn read(&self, inumber: u32) -> Result<Inode> {
        let inode = self.inode_table.get(inumber)?;
        if !inode.is_valid() {
            return Err(FsError::NotFound(inumber));
        }
        Ok(inode)
    }

    /// 向文件追加一次数据，单次最多一个块。
    /// 按约定调用方（copyin 等）以块对齐的方式连续投喂；
    /// 核心不补零，想要干净的块尾就传入预清零的缓冲区。
    pub fn write(&mut self, inumber: u32, data: &[u8]) -> Result<Inode> {
        if data.len() > BLOCK_SIZE {
            return Err(FsError::OversizedWrite(data.len()));
        }
        let mut inode = self.inode_table.get(inumber)?;
        if !inode.is_valid() {
            return Err(FsError::NotFound(inumber));
        }

        // 先判容量：直接指针占满且间接块也写满才算文件到顶
        let direct_slot = inode.direct.iter().position(|&p| p == 0);
        let mut existing_indirect = None;
        if direct_slot.is_none() && inode.indirect != 0 {
            let iblock = self.read_indirect(inode.indirect)?;
            if iblock.is_full() {
                return Err(FsError::FileTooLarge);
            }
            existing_indirect = Some(iblock);
        }

        // 分配数据块并写入调用方给的字节
        let block_id = self.free_map.alloc()?;
        if let Err(e) = self.device.write_block(block_id, data) {
            self.free_map.release(block_id)?;
            return Err(e.into());
        }

        // 把新块号挂进 inode：优先第一个空的直接槽位，否则进间接块
        match direct_slot {
            Some(slot) => inode.direct[slot] = block_id,
            None => {
                let mut iblock = match existing_indirect {
                    Some(iblock) => iblock,
                    None => {
                        // 惰性建立间接块；分配失败就退还刚拿到的数据块
                        match self.free_map.alloc() {
                            Ok(indirect_id) => {
                                inode.indirect = indirect_id;
                                IndirectBlock::zeroed()
                            }
                            Err(e) => {
                                self.free_map.release(block_id)?;
                                return Err(e);
                            }
                        }
                    }
                };
                let slot = match iblock.first_free_slot() {
                    Some(slot) => slot,
                    None => {
                        self.free_map.release(block_id)?;
                        return Err(FsError::FileTooLarge);
                    }
                };
                iblock.pointers[slot] = block_id;
                self.device.write_block(inode.indirect, &iblock.encode()?)?;
            }
        }

        inode.size += data.len() as u32;
        self.inode_table
            .store(self.device.as_ref(), inumber, inode)?;
        Ok(inode)
    }

    /// 删除文件并归还它占用的全部数据块。对未分配的 inode 幂等。
    pub fn remove(&mut self, inumber: u32) -> Result<()> {
        let mut inode = self.inode_table.get(inumber)?;
        if !inode.is_valid() {
            return Ok(());
        }

        let zero = [0u8; BLOCK_SIZE];
        for slot in 0..inode.direct.len() {
            let block_id = inode.direct[slot];
            if block_id != 0 {
                self.device.write_block(block_id, &zero)?;
                self.free_map.release(block_id)?;
                inode.direct[slot] = 0;
            }
        }

        if inode.indirect != 0 {
            // 间接块指向的数据块同样清零归还，最后处理间接块本身
            let iblock = self.read_indirect(inode.indirect)?;
            for &ptr in iblock.pointers.iter() {
                if ptr != 0 {
                    self.device.write_block(ptr, &zero)?;
                    self.free_map.release(ptr)?;
                }
            }
            self.device.write_block(inode.indirect, &zero)?;
            self.free_map.release(inode.indirect)?;
            inode.indirect = 0;
        }

        inode.valid = 0;
        inode.size = 0;
        self.inode_table
            .store(self.device.as_ref(), inumber, inode)?;
        Ok(())
    }

    /// 按遍历顺序列出文件占用的数据块号：先直接指针，再间接块内的
    /// 每个非零指针（不含间接块本身）。
    pub fn data_blocks(&self, inumber: u32) -> Result<Vec<u32>> {
        let inode = self.read(inumber)?;
        let mut blocks: Vec<u32> = inode.direct.iter().copied().filter(|&p| p != 0).collect();
        if inode.indirect != 0 {
            let iblock = self.read_indirect(inode.indirect)?;
            blocks.extend(iblock.pointers.iter().copied().filter(|&p| p != 0));
        }
        Ok(blocks)
    }

    /// 把文件内容写到 out（通常是标准输出）。
    /// 每个数据块都完整输出 4096 字节，按 Size 截断尾块由调用方自理。
    pub fn cat<W: Write>(&self, inumber: u32, out: &mut W) -> Result<()> {
        let mut buf: Block = [0u8; BLOCK_SIZE];
        for block_id in self.data_blocks(inumber)? {
            self.device.read_block(block_id, &mut buf)?;
            out.write_all(&buf)?;
        }
        Ok(())
    }

    /// 读出一个数据块的原始内容（copyout 等调用方使用）。
    pub fn read_data_block(&self, block_id: u32) -> Result<Block> {
        let mut buf: Block = [0u8; BLOCK_SIZE];
        self.device.read_block(block_id, &mut buf)?;
        Ok(buf)
    }

    fn read_indirect(&self, block_id: u32) -> Result<IndirectBlock> {
        let mut buf: Block = [0u8; BLOCK_SIZE];
        self.device.read_block(block_id, &mut buf)?;
        IndirectBlock::decode(&buf)
    }

    /// 生成一份可读的卷转储：超级块、所有非空 inode、设备读写计数、
    /// 空闲块表。不要求先挂载，空闲块表直接按磁盘内容重建；
    /// 魔数不合法只会略去 "magic number is valid" 一行，其余照常输出。
    pub fn debug(device: &D) -> Result<String> {
        let sb = super_block::load_unchecked(device)?;

        let mut out = String::new();
        out.push_str("SuperBlock:\n");
        if sb.magic_valid() {
            out.push_str("    magic number is valid\n");
        }
        out.push_str(&format!("    {} blocks\n", sb.blocks));
        out.push_str(&format!("    {} inode blocks\n", sb.inode_blocks));
        out.push_str(&format!("    {} inodes\n", sb.inodes));

        let inode_table = InodeTable::load(device, sb.inode_blocks)?;
        for (inumber, inode) in inode_table.iter() {
            if inode.size == 0 {
                continue;
            }
            out.push_str(&format!("inode {}:\n", inumber));
            out.push_str(&format!("    size: {} bytes\n", inode.size));
            let direct = inode
                .direct
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!("    direct blocks: {}\n", direct));
            if inode.indirect != 0 {
                out.push_str(&format!("    indirect block: {}\n", inode.indirect));
            }
        }

        out.push_str(&format!("{} disk block reads\n", device.reads()));
        out.push_str(&format!("{} disk block writes\n", device.writes()));

        // 块数字段按设备实际大小取，超级块写坏了也能把表画出来
        let free_map =
            FreeBlockMap::rebuild(device, device.size(), sb.data_start(), &inode_table)?;
        out.push_str(&format!("free block map: {:?}\n", free_map.snapshot()));

        Ok(out)
    }
}
