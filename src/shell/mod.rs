pub mod command;
pub mod parse;

use std::io::{self, Write};
use std::sync::Arc;

use crate::disk::{BlockDevice, FileDisk};
use crate::fs::FileSystem;
use crate::shell::{command::Command, parse::parse_command};

/// 交互式命令行。磁盘在启动时打开，文件系统状态要等 mount 之后才存在。
pub fn start_shell(disk: FileDisk) {
    println!("SFS v0.1.0");
    println!(
        "Using image: {} ({} blocks)",
        disk.path().display(),
        disk.size()
    );
    println!("Type 'help' for command list.\n");

    let disk = Arc::new(disk);
    let mut fs: Option<FileSystem<FileDisk>> = None;

    loop {
        print!("sfs> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                println!("Error: failed to read input: {}", e);
                break;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match parse_command(input) {
            Some(Command::Quit) => break,
            Some(cmd) => command::execute_command(&cmd, &disk, &mut fs),
            None => println!("Invalid command. Type 'help' for command list."),
        }
    }

    // 退出前把挂载计数还回去
    if let Some(fs) = fs.take() {
        fs.unmount();
    }
    println!("Bye!");
}
