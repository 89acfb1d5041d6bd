use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::Arc;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::error;

use crate::disk::{BlockDevice, FileDisk, BLOCK_SIZE};
use crate::fs::{FileSystem, Result};

const NOT_MOUNTED: &str = "no volume mounted. run 'mount' first.";

#[derive(Debug)]
pub enum Command {
    Help,
    Format,
    Mount,
    Debug,
    Create,
    Stat(u32),
    Cat(u32),
    Remove(u32),
    CopyIn(String, u32),
    CopyOut(u32, String),
    Quit,
}

pub fn execute_command(
    cmd: &Command,
    disk: &Arc<FileDisk>,
    fs: &mut Option<FileSystem<FileDisk>>,
) {
    match cmd {
        Command::Help => print_help(),
        Command::Format => {
            let bar = ProgressBar::new(disk.size() as u64);
            bar.set_style(
                ProgressStyle::with_template("[{bar:40.green/black}] {pos}/{len} blocks {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            match FileSystem::format_with(disk.as_ref(), |done, _| bar.set_position(done as u64)) {
                Ok(()) => bar.finish_with_message("disk formatted."),
                Err(e) => {
                    bar.abandon();
                    error!("format failed: {}", e);
                    println!("{} could not format: {}", "error:".red(), e);
                }
            }
            // 旧的挂载状态对新卷不再有效
            if let Some(old) = fs.take() {
                old.unmount();
            }
        }
        Command::Mount => match FileSystem::mount(Arc::clone(disk)) {
            Ok(mounted) => {
                // 重新挂载：丢弃旧状态，换上刚重建好的
                if let Some(old) = fs.take() {
                    old.unmount();
                }
                *fs = Some(mounted);
                println!("disk mounted.");
            }
            Err(e) => println!("{} failed to mount disk: {}", "error:".red(), e),
        },
        Command::Debug => match FileSystem::debug(disk.as_ref()) {
            Ok(dump) => print!("{}", dump),
            Err(e) => println!("{} failure on debug command: {}", "error:".red(), e),
        },
        Command::Create => match fs.as_mut() {
            Some(fs) => match fs.create() {
                Ok(inumber) => println!("created inode {}.", inumber),
                Err(e) => println!("{} failure on create command: {}", "error:".red(), e),
            },
            None => println!("{}", NOT_MOUNTED.yellow()),
        },
        Command::Stat(inumber) => match fs.as_ref() {
            Some(fs) => match fs.stat(*inumber) {
                Ok(size) => println!("inode {} has size {} bytes.", inumber, size),
                Err(e) => println!("{} failure on stat command: {}", "error:".red(), e),
            },
            None => println!("{}", NOT_MOUNTED.yellow()),
        },
        Command::Cat(inumber) => match fs.as_ref() {
            Some(fs) => {
                let mut stdout = io::stdout().lock();
                if let Err(e) = fs.cat(*inumber, &mut stdout) {
                    println!("{} failure on cat command: {}", "error:".red(), e);
                }
            }
            None => println!("{}", NOT_MOUNTED.yellow()),
        },
        Command::Remove(inumber) => match fs.as_mut() {
            Some(fs) => match fs.remove(*inumber) {
                Ok(()) => println!("removed inode {}.", inumber),
                Err(e) => println!("{} failure on remove command: {}", "error:".red(), e),
            },
            None => println!("{}", NOT_MOUNTED.yellow()),
        },
        Command::CopyIn(path, inumber) => match fs.as_mut() {
            Some(fs) => match copy_in(fs, path, *inumber) {
                Ok(copied) => println!("{} bytes copied", copied),
                Err(e) => println!("{} failed on copyin command: {}", "error:".red(), e),
            },
            None => println!("{}", NOT_MOUNTED.yellow()),
        },
        Command::CopyOut(inumber, path) => match fs.as_ref() {
            Some(fs) => match copy_out(fs, *inumber, path) {
                Ok(copied) => println!("{} bytes copied", copied),
                Err(e) => println!("{} failed on copyout command: {}", "error:".red(), e),
            },
            None => println!("{}", NOT_MOUNTED.yellow()),
        },
        Command::Quit => {}
    }
}

/// 把宿主机文件按块灌进卷里。
/// 缓冲区每轮重新清零，没写满的块尾因此保持干净。
fn copy_in(fs: &mut FileSystem<FileDisk>, path: &str, inumber: u32) -> Result<u64> {
    let mut file = File::open(path)?;
    let mut copied = 0u64;

    loop {
        let mut chunk = [0u8; BLOCK_SIZE];
        // 尽量填满整块，只有最后一块允许不足
        let mut filled = 0;
        while filled < BLOCK_SIZE {
            let n = file.read(&mut chunk[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            break;
        }
        fs.write(inumber, &chunk[..filled])?;
        copied += filled as u64;
    }
    Ok(copied)
}

/// 把卷内文件拷出到宿主机，尾块按文件大小截断。
fn copy_out(fs: &FileSystem<FileDisk>, inumber: u32, path: &str) -> Result<u64> {
    let inode = fs.read(inumber)?;
    let mut file = File::create(path)?;

    let mut remaining = inode.size as u64;
    let mut copied = 0u64;
    for block_id in fs.data_blocks(inumber)? {
        if remaining == 0 {
            break;
        }
        let block = fs.read_data_block(block_id)?;
        let take = remaining.min(BLOCK_SIZE as u64) as usize;
        file.write_all(&block[..take])?;
        copied += take as u64;
        remaining -= take as u64;
    }
    Ok(copied)
}

fn print_help() {
    println!("{}", "SFS commands".bright_cyan().bold());
    println!(
        "{}",
        "
  format                   Build an empty volume on the image
  mount                    Load the volume and rebuild in-memory state
  debug                    Dump superblock, inodes and the free block map
  create                   Allocate a new inode
  stat    <inode>          Show file size
  cat     <inode>          Print file contents
  remove  <inode>          Delete a file and free its blocks
  copyin  <file> <inode>   Copy a host file into the volume
  copyout <inode> <file>   Copy a file out to the host
  help                     Show this help message
  quit / exit              Leave the shell
"
        .bright_black()
    );
}
