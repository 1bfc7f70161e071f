use crate::{
    disk::{Block, BlockDevice, BLOCK_SIZE},
    fs::{
        config::{MAX_NAME_LEN, PARENT_SLOT},
        dir_entry::{empty_dir, AccessRights, DirEntry, EntryKind},
        error::{FileSystemError, Result},
        FileSystem,
    },
};

/// 命令面：每个命令都遵循“先做完全部检查，再写盘”的纪律，
/// 失败路径上不落任何块；改动过分配关系的命令最后把 FAT 刷回磁盘。
impl<D: BlockDevice> FileSystem<D> {
    fn validate_name(name: &str) -> Result<()> {
        if name.as_bytes().len() > MAX_NAME_LEN {
            return Err(FileSystemError::NameTooLong(name.to_string()));
        }
        if name == "." || name == ".." {
            return Err(FileSystemError::InvalidPath(name.to_string()));
        }
        Ok(())
    }

    /// cp/mv 的目标判定：目标能整体解析成已有目录，就落到它里面沿用原名；
    /// 否则解析目标的父目录，最后一个分量作为新名字。
    fn locate_destination(&self, dst: &str, src_name: &str) -> Result<(u16, String)> {
        if let Ok(dir) = self.resolve_dir(dst) {
            return Ok((dir, src_name.to_string()));
        }
        let (dir, name) = self.resolve_parent(dst)?;
        Ok((dir, name.to_string()))
    }

    /// 新建文件。内容由调用方给出（shell 负责按行收集），
    /// 占 ceil(len / 块大小) 块，空内容也占一块。
    pub fn create(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let (dir_block, name) = self.resolve_parent(path)?;
        Self::validate_name(name)?;

        let mut entries = self.read_dir_block(dir_block)?;
        if Self::find_entry(&entries, name).is_some() {
            return Err(FileSystemError::AlreadyExists(name.to_string()));
        }
        let slot = Self::free_slot(&entries)
            .ok_or_else(|| FileSystemError::DirectoryFull(path.to_string()))?;

        let first_blk = self.write_chain(content)?;

        entries[slot] = DirEntry {
            name: name.to_string(),
            size: content.len() as u32,
            first_blk,
            kind: EntryKind::File,
            rights: AccessRights::READ | AccessRights::WRITE,
            parent_blk: dir_block,
        };
        self.write_dir_block(dir_block, &entries)?;
        self.sync()
    }

    /// 读出文件的精确字节内容（不含块尾填充）
    pub fn cat(&self, path: &str) -> Result<Vec<u8>> {
        let (_, entries, idx) = self.resolve_entry(path)?;
        if entries[idx].kind == EntryKind::Directory {
            return Err(FileSystemError::IsADirectory(path.to_string()));
        }
        self.read_file(&entries[idx])
    }

    /// 当前目录下全部已使用的记录，按槽位顺序
    pub fn ls(&self) -> Result<Vec<DirEntry>> {
        Ok(self
            .read_dir_block(self.cwd_block)?
            .into_iter()
            .filter(|e| e.is_used())
            .collect())
    }

    /// 复制文件：内容进一条全新的链，原文件不动，权限随源
    pub fn cp(&mut self, src: &str, dst: &str) -> Result<()> {
        let (_, src_entries, si) = self.resolve_entry(src)?;
        let source = src_entries[si].clone();
        if source.kind == EntryKind::Directory {
            return Err(FileSystemError::IsADirectory(src.to_string()));
        }

        let (target_dir, new_name) = self.locate_destination(dst, &source.name)?;
        Self::validate_name(&new_name)?;

        let mut entries = self.read_dir_block(target_dir)?;
        if Self::find_entry(&entries, &new_name).is_some() {
            return Err(FileSystemError::AlreadyExists(new_name));
        }
        let slot = Self::free_slot(&entries)
            .ok_or_else(|| FileSystemError::DirectoryFull(dst.to_string()))?;

        let content = self.read_file(&source)?;
        let first_blk = self.write_chain(&content)?;

        entries[slot] = DirEntry {
            name: new_name,
            size: source.size,
            first_blk,
            kind: EntryKind::File,
            rights: source.rights,
            parent_blk: target_dir,
        };
        self.write_dir_block(target_dir, &entries)?;
        self.sync()
    }

    /// 移动 / 改名：只改目录记录，不拷数据，不动 FAT。
    /// 移动目录时同步改写它自己块里的保留父记录。
    pub fn mv(&mut self, src: &str, dst: &str) -> Result<()> {
        let (src_dir, src_entries, si) = self.resolve_entry(src)?;
        let moving = src_entries[si].clone();

        let (target_dir, new_name) = self.locate_destination(dst, &moving.name)?;
        Self::validate_name(&new_name)?;

        // 目录不能移进自己或自己的子树，否则父链成环
        if moving.kind == EntryKind::Directory && self.is_ancestor(moving.first_blk, target_dir)? {
            return Err(FileSystemError::InvalidPath(format!(
                "cannot move a directory into itself: {}",
                src
            )));
        }

        if target_dir == src_dir {
            // 同目录内改名
            let mut entries = src_entries;
            if Self::find_entry(&entries, &new_name).is_some() {
                return Err(FileSystemError::AlreadyExists(new_name));
            }
            entries[si].name = new_name;
            self.write_dir_block(src_dir, &entries)?;
            return Ok(());
        }

        let mut target_entries = self.read_dir_block(target_dir)?;
        if Self::find_entry(&target_entries, &new_name).is_some() {
            return Err(FileSystemError::AlreadyExists(new_name));
        }
        let slot = Self::free_slot(&target_entries)
            .ok_or_else(|| FileSystemError::DirectoryFull(dst.to_string()))?;

        target_entries[slot] = DirEntry {
            name: new_name,
            parent_blk: target_dir,
            ..moving.clone()
        };

        if moving.kind == EntryKind::Directory {
            let mut own = self.read_dir_block(moving.first_blk)?;
            own[PARENT_SLOT].parent_blk = target_dir;
            self.write_dir_block(moving.first_blk, &own)?;
        }

        let mut cleared = src_entries;
        cleared[si] = DirEntry::empty();
        self.write_dir_block(src_dir, &cleared)?;
        self.write_dir_block(target_dir, &target_entries)?;
        Ok(())
    }

    /// 删除：文件整链归还 FAT；目录只有空了才能删，恰好归还一块
    pub fn rm(&mut self, path: &str) -> Result<()> {
        let (dir_block, mut entries, idx) = self.resolve_entry(path)?;
        let victim = entries[idx].clone();

        if victim.kind == EntryKind::Directory {
            if victim.first_blk == self.cwd_block {
                return Err(FileSystemError::InvalidPath(format!(
                    "cannot remove the current working directory: {}",
                    path
                )));
            }
            let children = self.read_dir_block(victim.first_blk)?;
            if children.iter().any(|e| e.is_used()) {
                return Err(FileSystemError::DirectoryNotEmpty(path.to_string()));
            }
        }

        self.fat.free_chain(victim.first_blk)?;
        entries[idx] = DirEntry::empty();
        self.write_dir_block(dir_block, &entries)?;
        self.sync()
    }

    /// 把 src 的精确字节内容接到 dst 的逻辑末尾：
    /// 先填满 dst 最后一个未写满的块，再按需分配新块。src 不变。
    pub fn append(&mut self, src: &str, dst: &str) -> Result<()> {
        let (_, src_entries, si) = self.resolve_entry(src)?;
        let source = src_entries[si].clone();
        if source.kind == EntryKind::Directory {
            return Err(FileSystemError::IsADirectory(src.to_string()));
        }

        let (dst_dir, mut dst_entries, di) = self.resolve_entry(dst)?;
        let target = dst_entries[di].clone();
        if target.kind == EntryKind::Directory {
            return Err(FileSystemError::IsADirectory(dst.to_string()));
        }

        // 自追加也成立：内容先整个读出来，之后才动 dst
        let content = self.read_file(&source)?;
        if content.is_empty() {
            return Ok(());
        }

        let tail_used = target.size as usize % BLOCK_SIZE;
        let tail_free = if tail_used == 0 {
            // size 为 0 时那一块整块可用；否则最后一块刚好写满
            if target.size == 0 {
                BLOCK_SIZE
            } else {
                0
            }
        } else {
            BLOCK_SIZE - tail_used
        };

        let extra = content.len().saturating_sub(tail_free);
        let new_blocks = (extra + BLOCK_SIZE - 1) / BLOCK_SIZE;
        if self.fat.free_count() < new_blocks {
            return Err(FileSystemError::DiskFull);
        }

        let chain = self.fat.chain(target.first_blk)?;
        let mut last = *chain.last().expect("a live chain has at least one block");
        let mut offset = 0usize;

        if tail_free > 0 {
            let mut buf: Block = [0; BLOCK_SIZE];
            self.disk.read_block(last as u64, &mut buf)?;
            let take = tail_free.min(content.len());
            buf[tail_used..tail_used + take].copy_from_slice(&content[..take]);
            self.disk.write_block(last as u64, &buf)?;
            offset = take;
        }

        while offset < content.len() {
            let block = self.fat.allocate()?;
            self.fat.link(last, block);
            let end = (offset + BLOCK_SIZE).min(content.len());
            let mut buf: Block = [0; BLOCK_SIZE];
            buf[..end - offset].copy_from_slice(&content[offset..end]);
            self.disk.write_block(block as u64, &buf)?;
            last = block;
            offset = end;
        }

        dst_entries[di].size = target.size + content.len() as u32;
        self.write_dir_block(dst_dir, &dst_entries)?;
        self.sync()
    }

    /// 新建子目录：分配一块格式化成空目录，保留记录指回所在目录
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        let (dir_block, name) = self.resolve_parent(path)?;
        Self::validate_name(name)?;

        let mut entries = self.read_dir_block(dir_block)?;
        if Self::find_entry(&entries, name).is_some() {
            return Err(FileSystemError::AlreadyExists(name.to_string()));
        }
        let slot = Self::free_slot(&entries)
            .ok_or_else(|| FileSystemError::DirectoryFull(path.to_string()))?;
        if self.fat.free_count() < 1 {
            return Err(FileSystemError::DiskFull);
        }

        let block = self.fat.allocate()?;
        self.disk.write_block(block as u64, &empty_dir(dir_block))?;

        entries[slot] = DirEntry {
            name: name.to_string(),
            size: 0,
            first_blk: block,
            kind: EntryKind::Directory,
            rights: AccessRights::READ | AccessRights::WRITE | AccessRights::EXECUTE,
            parent_blk: dir_block,
        };
        self.write_dir_block(dir_block, &entries)?;
        self.sync()
    }

    /// 切换工作目录并重算显示用的绝对路径
    pub fn cd(&mut self, path: &str) -> Result<()> {
        let block = self.resolve_dir(path)?;
        self.cwd_path = Self::updated_path(&self.cwd_path, path);
        self.cwd_block = block;
        Ok(())
    }

    /// 当前目录的绝对路径
    pub fn pwd(&self) -> &str {
        &self.cwd_path
    }

    /// 覆写一条记录的权限位，0..=7
    pub fn chmod(&mut self, rights: u8, path: &str) -> Result<()> {
        if rights > 7 {
            return Err(FileSystemError::InvalidRights(rights.to_string()));
        }
        let (dir_block, mut entries, idx) = self.resolve_entry(path)?;
        entries[idx].rights = AccessRights::from_bits_truncate(rights);
        self.write_dir_block(dir_block, &entries)
    }
}
