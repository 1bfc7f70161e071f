use crate::disk::BLOCK_SIZE;

/// 根目录固定占用 0 号块
pub const ROOT_BLOCK: u16 = 0;

/// FAT 表固定占用 1 号块
pub const FAT_BLOCK: u16 = 1;

/// 数据区从 2 号块开始（0、1 为保留块）
pub const DATA_START: u16 = 2;

/// FAT 表项哨兵值：空闲块
pub const FAT_FREE: i16 = 0;

/// FAT 表项哨兵值：链尾
pub const FAT_EOF: i16 = -1;

/// FAT 表项总数 = 块总数，一个表项 2 字节，整张表占满 1 号块
pub const FAT_ENTRY_COUNT: usize = BLOCK_SIZE / 2;

/// 文件名 / 目录名最大长度（字节）
pub const MAX_NAME_LEN: usize = 56;

/// 一条目录项在磁盘上的定长：56 + 4 + 2 + 1 + 1 + 2 = 66 字节
pub const DIR_ENTRY_SIZE: usize = 66;

/// 一个目录块能容纳的目录项数（块尾不足一条的 4 字节不使用）
pub const ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;

/// 目录块的 0 号槽位保留给“父目录”记录，用于 `..` 上行导航
pub const PARENT_SLOT: usize = 0;
