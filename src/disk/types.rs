/// 每个逻辑块（Block）的大小：4KB
/// 文件系统以“块”为最小读写单位。
pub const BLOCK_SIZE: usize = 4096;

/// 磁盘中包含的块总数。
/// FAT 每个表项 2 字节（i16），整张表必须恰好占满它预留的那一个块，
/// 所以块总数 = BLOCK_SIZE / 2 = 2048 块。
pub const BLOCK_COUNT: usize = BLOCK_SIZE / 2;

/// 虚拟磁盘总大小（单位：字节）：2048 * 4KB = 8MB
/// 用于创建固定大小的 disk.img 文件。
pub const DISK_SIZE: u64 = (BLOCK_SIZE * BLOCK_COUNT) as u64;

/// 定义一个逻辑块类型（每块 4KB 的字节数组）
/// 所有磁盘读写都以 Block 为单位进行。
pub type Block = [u8; BLOCK_SIZE];
