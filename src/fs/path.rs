use crate::{
    disk::BlockDevice,
    fs::{
        config::{FAT_ENTRY_COUNT, PARENT_SLOT, ROOT_BLOCK},
        dir_entry::{DirEntry, EntryKind},
        error::{FileSystemError, Result},
        FileSystem,
    },
};

/// 路径解析：绝对路径从根出发，相对路径从游标出发。
/// 分隔符之间的空分量直接丢弃，所以 `//a`、`a/`、`a//b` 都能容忍。
impl<D: BlockDevice> FileSystem<D> {
    pub(crate) fn split_path(path: &str) -> Vec<&str> {
        path.split('/').filter(|c| !c.is_empty()).collect()
    }

    fn start_block(&self, path: &str) -> u16 {
        if path.starts_with('/') {
            ROOT_BLOCK
        } else {
            self.cwd_block
        }
    }

    /// 在解码后的目录项里按名字线性查找已使用的记录，取第一个命中
    pub(crate) fn find_entry(entries: &[DirEntry], name: &str) -> Option<usize> {
        entries.iter().position(|e| e.is_used() && e.name == name)
    }

    /// 从 cur 进入一个路径分量。
    /// `.` 原地不动；`..` 走保留记录里的父块指针（根的父是它自己）；
    /// 其余名字必须命中一条目录类型的记录。
    fn step_into(&self, cur: u16, component: &str) -> Result<u16> {
        match component {
            "." => Ok(cur),
            ".." => {
                let entries = self.read_dir_block(cur)?;
                Ok(entries[PARENT_SLOT].parent_blk)
            }
            name => {
                let entries = self.read_dir_block(cur)?;
                match Self::find_entry(&entries, name) {
                    Some(i) if entries[i].kind == EntryKind::Directory => Ok(entries[i].first_blk),
                    Some(_) => Err(FileSystemError::NotADirectory(name.to_string())),
                    None => Err(FileSystemError::NotFound(name.to_string())),
                }
            }
        }
    }

    /// 把整个路径当目录解析，返回最终目录块。
    /// cd 和 cp/mv 判定“目标是不是已有目录”都走这里。
    pub(crate) fn resolve_dir(&self, path: &str) -> Result<u16> {
        let mut block = self.start_block(path);
        for component in Self::split_path(path) {
            block = self.step_into(block, component)?;
        }
        Ok(block)
    }

    /// 解析到最后一个分量的父目录，返回 (父目录块, 最后分量)。
    /// 创建类操作（create/mkdir）和按名定位都从这里拿到落点。
    pub(crate) fn resolve_parent<'a>(&self, path: &'a str) -> Result<(u16, &'a str)> {
        let components = Self::split_path(path);
        let (last, dirs) = components
            .split_last()
            .ok_or_else(|| FileSystemError::InvalidPath(path.to_string()))?;

        let mut block = self.start_block(path);
        for component in dirs {
            block = self.step_into(block, component)?;
        }
        Ok((block, *last))
    }

    /// 解析一条必须已存在的记录：返回 (父目录块, 解码后的目录项, 命中下标)
    pub(crate) fn resolve_entry(&self, path: &str) -> Result<(u16, Vec<DirEntry>, usize)> {
        let (dir_block, name) = self.resolve_parent(path)?;
        let entries = self.read_dir_block(dir_block)?;
        match Self::find_entry(&entries, name) {
            Some(i) => Ok((dir_block, entries, i)),
            None => Err(FileSystemError::NotFound(path.to_string())),
        }
    }

    /// candidate 是否是 dir 的祖先（含 dir 本身）。
    /// 沿各目录块的父指针上行到根，步数超过块总数视为父链成环。
    pub(crate) fn is_ancestor(&self, candidate: u16, start: u16) -> Result<bool> {
        let mut dir = start;
        let mut steps = 0usize;
        loop {
            if dir == candidate {
                return Ok(true);
            }
            if dir == ROOT_BLOCK {
                return Ok(false);
            }
            steps += 1;
            if steps > FAT_ENTRY_COUNT {
                return Err(FileSystemError::Corrupted(
                    "parent pointers form a cycle".to_string(),
                ));
            }
            let entries = self.read_dir_block(dir)?;
            dir = entries[PARENT_SLOT].parent_blk;
        }
    }

    /// 纯文本地把 cd 的输入叠加到当前显示路径上。
    /// 调用方必须先解析成功，这里只负责算显示串。
    pub(crate) fn updated_path(current: &str, input: &str) -> String {
        let mut parts: Vec<&str> = if input.starts_with('/') {
            Vec::new()
        } else {
            current.split('/').filter(|c| !c.is_empty()).collect()
        };

        for component in input.split('/').filter(|c| !c.is_empty()) {
            match component {
                "." => {}
                ".." => {
                    parts.pop();
                }
                name => parts.push(name),
            }
        }

        if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::MemDisk;

    fn fresh() -> FileSystem<MemDisk> {
        let mut fs = FileSystem::new(MemDisk::new());
        fs.format().unwrap();
        fs
    }

    #[test]
    fn split_discards_empty_components() {
        assert_eq!(
            FileSystem::<MemDisk>::split_path("//docs///note/"),
            vec!["docs", "note"]
        );
        assert!(FileSystem::<MemDisk>::split_path("/").is_empty());
    }

    #[test]
    fn resolve_dir_walks_absolute_and_relative_paths() {
        let mut fs = fresh();
        fs.mkdir("docs").unwrap();
        fs.mkdir("docs/work").unwrap();

        let abs = fs.resolve_dir("/docs/work").unwrap();
        let rel = fs.resolve_dir("docs/work").unwrap();
        assert_eq!(abs, rel);
        assert_ne!(abs, ROOT_BLOCK);
    }

    #[test]
    fn dot_and_dotdot_navigate_without_records() {
        let mut fs = fresh();
        fs.mkdir("docs").unwrap();
        let docs = fs.resolve_dir("docs").unwrap();

        assert_eq!(fs.resolve_dir("docs/.").unwrap(), docs);
        assert_eq!(fs.resolve_dir("docs/..").unwrap(), ROOT_BLOCK);
        // 根的父目录是它自己
        assert_eq!(fs.resolve_dir("/../../..").unwrap(), ROOT_BLOCK);
    }

    #[test]
    fn file_in_the_middle_of_a_path_is_not_a_directory() {
        let mut fs = fresh();
        fs.create("note", b"x").unwrap();
        assert!(matches!(
            fs.resolve_dir("note/deeper"),
            Err(FileSystemError::NotADirectory(_))
        ));
    }

    #[test]
    fn missing_component_is_not_found() {
        let fs = fresh();
        assert!(matches!(
            fs.resolve_dir("/ghost"),
            Err(FileSystemError::NotFound(_))
        ));
        assert!(matches!(
            fs.resolve_entry("/ghost"),
            Err(FileSystemError::NotFound(_))
        ));
    }

    #[test]
    fn resolve_parent_rejects_an_empty_path() {
        let fs = fresh();
        assert!(matches!(
            fs.resolve_parent("/"),
            Err(FileSystemError::InvalidPath(_))
        ));
        assert!(matches!(
            fs.resolve_parent(""),
            Err(FileSystemError::InvalidPath(_))
        ));
    }

    #[test]
    fn resolve_entry_finds_by_exact_name() {
        let mut fs = fresh();
        fs.mkdir("docs").unwrap();
        fs.create("/docs/note", b"hello\n").unwrap();

        let (dir_block, entries, idx) = fs.resolve_entry("/docs/note").unwrap();
        assert_eq!(dir_block, fs.resolve_dir("/docs").unwrap());
        assert_eq!(entries[idx].name, "note");
        assert_eq!(entries[idx].size, 6);
    }

    #[test]
    fn ancestor_walk_follows_parent_pointers() {
        let mut fs = fresh();
        fs.mkdir("a").unwrap();
        fs.mkdir("a/b").unwrap();
        let a = fs.resolve_dir("a").unwrap();
        let b = fs.resolve_dir("a/b").unwrap();

        assert!(fs.is_ancestor(a, b).unwrap());
        assert!(fs.is_ancestor(ROOT_BLOCK, b).unwrap());
        assert!(!fs.is_ancestor(b, a).unwrap());
    }

    #[test]
    fn updated_path_is_pure_text() {
        type Fs = FileSystem<MemDisk>;
        assert_eq!(Fs::updated_path("/", "docs"), "/docs");
        assert_eq!(Fs::updated_path("/docs", ".."), "/");
        assert_eq!(Fs::updated_path("/docs", "/other/x"), "/other/x");
        assert_eq!(Fs::updated_path("/a/b", "../c/./d"), "/a/c/d");
        assert_eq!(Fs::updated_path("/", "../.."), "/");
    }
}
