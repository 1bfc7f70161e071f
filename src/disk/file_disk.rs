use std::{
    fs::{File, OpenOptions},
    io::{Read, Result, Seek, SeekFrom, Write},
    sync::{mpsc::Sender, Mutex},
};

use crate::{
    disk::{
        block_device::BlockDevice,
        types::{Block, BLOCK_SIZE, DISK_SIZE},
    },
    shell::BootProgress,
};

/// 文件型虚拟磁盘：disk.img 被划分为定长块，按块号寻址。
#[derive(Debug)]
pub struct FileDisk {
    file: Mutex<File>,
}

impl FileDisk {
    pub fn new(path: &str, tx: &Sender<BootProgress>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        if file.metadata()?.len() < DISK_SIZE {
            let _ = tx.send(BootProgress::Step("🪶 Allocating disk space..."));
            file.set_len(DISK_SIZE)?;
        }
        let _ = tx.send(BootProgress::Progress(50));

        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl BlockDevice for FileDisk {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> Result<()> {
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(block_id * BLOCK_SIZE as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, block_id: u64, buf: &Block) -> Result<()> {
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(block_id * BLOCK_SIZE as u64))?;
        file.write_all(buf)?;
        Ok(())
    }
}
