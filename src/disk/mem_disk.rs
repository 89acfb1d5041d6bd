use std::{
    io::{Error, ErrorKind, Result},
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
};

use crate::disk::{
    block_device::BlockDevice,
    types::{Block, BLOCK_SIZE},
};

/// 测试用内存磁盘：一段连续内存按块切分，语义与 FileDisk 一致。
#[derive(Debug)]
pub struct MemDisk {
    data: Mutex<Vec<u8>>,
    blocks: u32,
    reads: AtomicU32,
    writes: AtomicU32,
    mounts: AtomicU32,
}

impl MemDisk {
    pub fn new(nblocks: u32) -> Self {
        Self {
            data: Mutex::new(vec![0u8; nblocks as usize * BLOCK_SIZE]),
            blocks: nblocks,
            reads: AtomicU32::new(0),
            writes: AtomicU32::new(0),
            mounts: AtomicU32::new(0),
        }
    }

    fn sanity_check(&self, block_id: u32) -> Result<()> {
        if block_id >= self.blocks {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "block {} out of range (disk has {} blocks)",
                    block_id, self.blocks
                ),
            ));
        }
        Ok(())
    }
}

impl BlockDevice for MemDisk {
    fn size(&self) -> u32 {
        self.blocks
    }

    fn read_block(&self, block_id: u32, buf: &mut Block) -> Result<()> {
        self.sanity_check(block_id)?;
        let start = block_id as usize * BLOCK_SIZE;
        let data = self.data.lock().unwrap();
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, block_id: u32, buf: &[u8]) -> Result<()> {
        if buf.len() > BLOCK_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "write of {} bytes exceeds block size {}",
                    buf.len(),
                    BLOCK_SIZE
                ),
            ));
        }
        self.sanity_check(block_id)?;
        let start = block_id as usize * BLOCK_SIZE;
        let mut data = self.data.lock().unwrap();
        data[start..start + buf.len()].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn mount(&self) {
        self.mounts.fetch_add(1, Ordering::Relaxed);
    }

    fn unmount(&self) {
        let _ = self
            .mounts
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |m| m.checked_sub(1));
    }

    fn mounts(&self) -> u32 {
        self.mounts.load(Ordering::Relaxed)
    }

    fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }

    fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }
}
