use std::{io::Result, sync::Mutex};

use crate::disk::{
    block_device::BlockDevice,
    types::{Block, BLOCK_COUNT, BLOCK_SIZE},
};

/// 内存型虚拟磁盘：与 FileDisk 同一接口，不落盘。
/// 测试里可以在一个进程内同时挂多个独立的卷。
#[derive(Debug)]
pub struct MemDisk {
    blocks: Mutex<Vec<u8>>,
}

impl MemDisk {
    pub fn new() -> Self {
        Self {
            blocks: Mutex::new(vec![0u8; BLOCK_SIZE * BLOCK_COUNT]),
        }
    }
}

impl Default for MemDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDevice for MemDisk {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> Result<()> {
        let blocks = self.blocks.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        buf.copy_from_slice(&blocks[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_id: u64, buf: &Block) -> Result<()> {
        let mut blocks = self.blocks.lock().unwrap();
        let start = block_id as usize * BLOCK_SIZE;
        blocks[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }
}
