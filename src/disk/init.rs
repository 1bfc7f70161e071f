use crate::{disk::file_disk::FileDisk, fs::FileSystem, shell::BootProgress};
use std::sync::mpsc::Sender;

pub fn perform_disk_initialization(tx: Sender<BootProgress>) {
    const DISK_PATH: &str = "disk.img";

    let _ = tx.send(BootProgress::Step("🧠 Initializing virtual disk..."));

    let disk_exists = std::path::Path::new(DISK_PATH).exists();

    let disk = match FileDisk::new(DISK_PATH, &tx) {
        Ok(d) => d,
        Err(e) => {
            let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
            return;
        }
    };

    let _ = tx.send(BootProgress::Step("⚙️ Mounting file system..."));

    let mut fs = FileSystem::new(disk);

    if !disk_exists {
        // 只有“明确是新磁盘”才格式化
        let _ = tx.send(BootProgress::Step(
            "🔧 No disk found, formatting new file system...",
        ));

        if let Err(e) = fs.format() {
            let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
            return;
        }
    }

    // 不论是否新盘，最终都要 mount
    if let Err(e) = fs.mount() {
        let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
        return;
    }

    let _ = tx.send(BootProgress::Progress(100));
    let _ = tx.send(BootProgress::Finished(Ok(fs)));
}
