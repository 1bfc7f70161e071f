use crate::{
    disk::{Block, BlockDevice, BLOCK_SIZE},
    fs::{
        config::{PARENT_SLOT, ROOT_BLOCK},
        dir_entry::{decode_dir, empty_dir, encode_dir, DirEntry},
        error::{FileSystemError, Result},
        fat::FatTable,
    },
};

pub mod config;
pub mod dir_entry;
pub mod error;
pub mod fat;
pub mod ops;
pub mod path;

/// 单卷文件系统会话：底层磁盘 + 内存中的 FAT + 工作目录游标。
/// 所有命令都走这一个对象，一个进程里可以同时挂多个独立的卷。
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    disk: D,                // 底层块设备
    fat: FatTable,          // 内存中的文件分配表
    cwd_block: u16,         // 当前目录所在块号
    cwd_path: String,       // 当前目录的绝对路径（仅用于显示）
}

impl<D: BlockDevice> FileSystem<D> {
    pub fn new(disk: D) -> Self {
        Self {
            disk,
            fat: FatTable::formatted(),
            cwd_block: ROOT_BLOCK,
            cwd_path: "/".to_string(),
        }
    }

    /// 格式化：清空 FAT（仅保留 0、1 号块）、重建空的根目录、游标回到根
    pub fn format(&mut self) -> Result<()> {
        self.fat = FatTable::formatted();
        // 根目录的保留记录指向自身：根是自己的父目录
        self.disk
            .write_block(ROOT_BLOCK as u64, &empty_dir(ROOT_BLOCK))?;
        self.fat.sync(&self.disk)?;
        self.cwd_block = ROOT_BLOCK;
        self.cwd_path = "/".to_string();
        Ok(())
    }

    /// 挂载：从 1 号块读入 FAT 并校验，游标回到根
    pub fn mount(&mut self) -> Result<()> {
        self.fat = FatTable::load(&self.disk)?;
        self.cwd_block = ROOT_BLOCK;
        self.cwd_path = "/".to_string();
        Ok(())
    }

    /// 把 FAT 刷回磁盘。每个改动分配关系的命令自己会调，退出时再调一次兜底。
    pub fn sync(&self) -> Result<()> {
        self.fat.sync(&self.disk)
    }

    /// 当前目录的绝对路径（shell 提示符用）
    pub fn current_path(&self) -> &str {
        &self.cwd_path
    }

    // ---- 块级辅助 ----

    /// 读入一个目录块并解码成目录项数组
    pub(crate) fn read_dir_block(&self, block: u16) -> Result<Vec<DirEntry>> {
        let mut buf: Block = [0; BLOCK_SIZE];
        self.disk.read_block(block as u64, &mut buf)?;
        Ok(decode_dir(&buf))
    }

    /// 编码并写回一个目录块
    pub(crate) fn write_dir_block(&self, block: u16, entries: &[DirEntry]) -> Result<()> {
        self.disk.write_block(block as u64, &encode_dir(entries))?;
        Ok(())
    }

    /// 沿 FAT 链读出文件的精确字节内容（不含块尾填充）
    pub(crate) fn read_file(&self, entry: &DirEntry) -> Result<Vec<u8>> {
        let chain = self.fat.chain(entry.first_blk)?;
        let mut content = Vec::with_capacity(entry.size as usize);
        let mut remaining = entry.size as usize;
        let mut buf: Block = [0; BLOCK_SIZE];
        for block in chain {
            if remaining == 0 {
                break;
            }
            self.disk.read_block(block as u64, &mut buf)?;
            let take = remaining.min(BLOCK_SIZE);
            content.extend_from_slice(&buf[..take]);
            remaining -= take;
        }
        if remaining > 0 {
            return Err(FileSystemError::Corrupted(format!(
                "file '{}' is shorter on disk than its recorded size",
                entry.name
            )));
        }
        Ok(content)
    }

    /// 内容需要的块数。空内容也占一块：first_blk == 0 被用作“空槽位”标记，
    /// 活的记录必须真实拥有至少一块。
    pub(crate) fn blocks_for(len: usize) -> usize {
        ((len + BLOCK_SIZE - 1) / BLOCK_SIZE).max(1)
    }

    /// 分配一条新链并写入内容，返回链首块号。
    /// 调用方负责先用 free_count 做容量预检查。
    pub(crate) fn write_chain(&mut self, data: &[u8]) -> Result<u16> {
        let needed = Self::blocks_for(data.len());
        if self.fat.free_count() < needed {
            return Err(FileSystemError::DiskFull);
        }

        let mut first = 0u16;
        let mut prev: Option<u16> = None;
        for i in 0..needed {
            let block = self.fat.allocate()?;
            let mut buf: Block = [0; BLOCK_SIZE];
            let start = i * BLOCK_SIZE;
            if start < data.len() {
                let end = (start + BLOCK_SIZE).min(data.len());
                buf[..end - start].copy_from_slice(&data[start..end]);
            }
            self.disk.write_block(block as u64, &buf)?;

            match prev {
                Some(p) => self.fat.link(p, block),
                None => first = block,
            }
            prev = Some(block);
        }
        Ok(first)
    }

    /// 在目录项数组里找一个空槽位（跳过保留的 0 号槽位）
    pub(crate) fn free_slot(entries: &[DirEntry]) -> Option<usize> {
        entries
            .iter()
            .enumerate()
            .skip(PARENT_SLOT + 1)
            .find(|(_, e)| !e.is_used())
            .map(|(i, _)| i)
    }
}
