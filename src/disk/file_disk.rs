use std::{
    fs::{File, OpenOptions},
    io::{Error, ErrorKind, Read, Result, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
};

use crate::disk::{
    block_device::BlockDevice,
    types::{Block, BLOCK_SIZE},
};

/// 基于镜像文件的虚拟磁盘：一个定长文件被切分成等长的 4KB 块。
#[derive(Debug)]
pub struct FileDisk {
    file: Mutex<File>,
    path: PathBuf,
    blocks: u32,
    reads: AtomicU32,
    writes: AtomicU32,
    mounts: AtomicU32,
}

impl FileDisk {
    /// 打开（必要时创建）镜像文件，并扩展到 nblocks 块。
    pub fn open<P: AsRef<Path>>(path: P, nblocks: u32) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        file.set_len(nblocks as u64 * BLOCK_SIZE as u64)?;

        Ok(Self {
            file: Mutex::new(file),
            path: path.as_ref().to_path_buf(),
            blocks: nblocks,
            reads: AtomicU32::new(0),
            writes: AtomicU32::new(0),
            mounts: AtomicU32::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // 访问镜像前先确认块号落在范围内
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

impl BlockDevice for FileDisk {
    fn size(&self) -> u32 {
        self.blocks
    }

    fn read_block(&self, block_id: u32, buf: &mut Block) -> Result<()> {
        self.sanity_check(block_id)?;
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(block_id as u64 * BLOCK_SIZE as u64))?;
        // 读不满一个块按 I/O 错误处理
        file.read_exact(buf)?;
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
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(block_id as u64 * BLOCK_SIZE as u64))?;
        file.write_all(buf)?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn mount(&self) {
        self.mounts.fetch_add(1, Ordering::Relaxed);
    }

    fn unmount(&self) {
        // 不会降到 0 以下
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
