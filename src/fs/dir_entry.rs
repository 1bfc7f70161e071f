use bitflags::bitflags;

use crate::{
    disk::{Block, BLOCK_SIZE},
    fs::config::{DIR_ENTRY_SIZE, ENTRIES_PER_BLOCK, MAX_NAME_LEN, PARENT_SLOT},
};

bitflags! {
    /// 访问权限位：read (0x04) / write (0x02) / execute (0x01)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessRights: u8 {
        const READ = 0x04;
        const WRITE = 0x02;
        const EXECUTE = 0x01;
    }
}

impl AccessRights {
    /// 格式化成 `rwx` 形式，缺少的位用 `-` 占位
    pub fn symbolic(&self) -> String {
        let mut s = String::with_capacity(3);
        s.push(if self.contains(Self::READ) { 'r' } else { '-' });
        s.push(if self.contains(Self::WRITE) { 'w' } else { '-' });
        s.push(if self.contains(Self::EXECUTE) { 'x' } else { '-' });
        s
    }
}

// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// 一条目录项，磁盘上定长 66 字节：
/// name[56] + size(u32 LE) + first_blk(u16 LE) + kind(u8) + rights(u8) + parent_blk(u16 LE)
///
/// first_blk == 0 表示该槽位未使用（0 号块是根目录，普通链不可能从 0 开始）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub size: u32,
    pub first_blk: u16,
    pub kind: EntryKind,
    pub rights: AccessRights,
    pub parent_blk: u16,
}

impl DirEntry {
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            size: 0,
            first_blk: 0,
            kind: EntryKind::File,
            rights: AccessRights::empty(),
            parent_blk: 0,
        }
    }

    /// 目录块 0 号槽位的保留记录：first_blk 恒为 0（不参与名字查找），
    /// parent_blk 指向所在目录的父目录块，供 `..` 上行。
    pub fn reserved(parent_blk: u16) -> Self {
        Self {
            name: "..".to_string(),
            size: 0,
            first_blk: 0,
            kind: EntryKind::Directory,
            rights: AccessRights::empty(),
            parent_blk,
        }
    }

    pub fn is_used(&self) -> bool {
        self.first_blk != 0
    }

    /// 序列化成定长 66 字节。超长的名字按字节截断，合法性由调用方保证。
    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        let name_bytes = self.name.as_bytes();
        let name_len = name_bytes.len().min(MAX_NAME_LEN);
        raw[..name_len].copy_from_slice(&name_bytes[..name_len]);
        raw[56..60].copy_from_slice(&self.size.to_le_bytes());
        raw[60..62].copy_from_slice(&self.first_blk.to_le_bytes());
        raw[62] = match self.kind {
            EntryKind::File => 0,
            EntryKind::Directory => 1,
        };
        raw[63] = self.rights.bits();
        raw[64..66].copy_from_slice(&self.parent_blk.to_le_bytes());
        raw
    }

    /// 从 66 字节原始数据还原，不做合法性校验
    pub fn from_bytes(raw: &[u8]) -> Self {
        let name_len = raw[..MAX_NAME_LEN]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_NAME_LEN);
        let name = String::from_utf8_lossy(&raw[..name_len]).into_owned();
        Self {
            name,
            size: u32::from_le_bytes([raw[56], raw[57], raw[58], raw[59]]),
            first_blk: u16::from_le_bytes([raw[60], raw[61]]),
            kind: if raw[62] == 1 {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            rights: AccessRights::from_bits_truncate(raw[63]),
            parent_blk: u16::from_le_bytes([raw[64], raw[65]]),
        }
    }
}

/// 把一个原始块解释为定长目录项数组（62 条，块尾 4 字节不使用）
pub fn decode_dir(block: &Block) -> Vec<DirEntry> {
    (0..ENTRIES_PER_BLOCK)
        .map(|i| DirEntry::from_bytes(&block[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE]))
        .collect()
}

/// decode_dir 的逆操作。不足 62 条的部分补空槽位，多余的忽略。
pub fn encode_dir(entries: &[DirEntry]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    let empty = DirEntry::empty();
    for i in 0..ENTRIES_PER_BLOCK {
        let entry = entries.get(i).unwrap_or(&empty);
        block[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
    }
    block
}

/// 构造一个空目录块：仅 0 号槽位放保留的父目录记录
pub fn empty_dir(parent_blk: u16) -> Block {
    let mut entries = vec![DirEntry::empty(); ENTRIES_PER_BLOCK];
    entries[PARENT_SLOT] = DirEntry::reserved(parent_blk);
    encode_dir(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_round_trip() {
        let entry = DirEntry {
            name: "notes.txt".to_string(),
            size: 1234,
            first_blk: 7,
            kind: EntryKind::File,
            rights: AccessRights::READ | AccessRights::WRITE,
            parent_blk: 3,
        };
        let raw = entry.to_bytes();
        assert_eq!(DirEntry::from_bytes(&raw), entry);
    }

    #[test]
    fn name_is_nul_padded_to_fixed_width() {
        let entry = DirEntry {
            name: "a".to_string(),
            size: 0,
            first_blk: 2,
            kind: EntryKind::Directory,
            rights: AccessRights::all(),
            parent_blk: 0,
        };
        let raw = entry.to_bytes();
        assert_eq!(raw[0], b'a');
        assert!(raw[1..MAX_NAME_LEN].iter().all(|&b| b == 0));
        assert_eq!(DirEntry::from_bytes(&raw).name, "a");
    }

    #[test]
    fn max_length_name_survives_without_terminator() {
        let name = "x".repeat(MAX_NAME_LEN);
        let mut entry = DirEntry::empty();
        entry.name = name.clone();
        entry.first_blk = 9;
        assert_eq!(DirEntry::from_bytes(&entry.to_bytes()).name, name);
    }

    #[test]
    fn dir_block_round_trip_and_slack_bytes_untouched() {
        let mut entries = vec![DirEntry::empty(); ENTRIES_PER_BLOCK];
        entries[PARENT_SLOT] = DirEntry::reserved(5);
        entries[3] = DirEntry {
            name: "f".to_string(),
            size: 10,
            first_blk: 12,
            kind: EntryKind::File,
            rights: AccessRights::READ,
            parent_blk: 5,
        };
        let block = encode_dir(&entries);
        // 62 * 66 = 4092，块尾 4 字节保持为 0
        assert!(block[ENTRIES_PER_BLOCK * DIR_ENTRY_SIZE..].iter().all(|&b| b == 0));
        assert_eq!(decode_dir(&block), entries);
    }

    #[test]
    fn reserved_record_never_matches_a_name_scan() {
        let block = empty_dir(4);
        let entries = decode_dir(&block);
        assert!(!entries[PARENT_SLOT].is_used());
        assert_eq!(entries[PARENT_SLOT].parent_blk, 4);
        assert!(entries[1..].iter().all(|e| !e.is_used()));
    }

    #[test]
    fn rights_symbolic_format() {
        assert_eq!((AccessRights::READ | AccessRights::WRITE).symbolic(), "rw-");
        assert_eq!(AccessRights::all().symbolic(), "rwx");
        assert_eq!(AccessRights::empty().symbolic(), "---");
    }
}
