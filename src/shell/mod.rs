pub mod command;
pub mod parse;

use crate::{
    disk::{init::perform_disk_initialization, FileDisk},
    fs::FileSystem,
    shell::{command::execute_command, parse::parse_command},
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::{error::Error, io::stdout, path::PathBuf, sync::mpsc, thread};

/// 磁盘初始化线程发回来的启动进度
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Result<FileSystem<FileDisk>, Box<dyn Error + Send + Sync>>),
}

pub fn start_shell() {
    let mut fs = match boot() {
        Some(fs) => fs,
        None => return,
    };

    let username = whoami::username();
    let hostname = whoami::hostname();

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    // 初始化 reedline
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fatfs_history");

    let mut line_editor = Reedline::create().with_history(Box::new(
        reedline::FileBackedHistory::with_file(100, history_path).unwrap(),
    ));

    // 命令补全
    let commands: Vec<String> = [
        "help", "format", "create", "cat", "ls", "cp", "mv", "rm", "append", "mkdir", "cd",
        "pwd", "chmod", "exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let completer = reedline::DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!(
                "{}@{}:{}",
                username,
                hostname,
                fs.current_path()
            )),
            DefaultPromptSegment::Empty,
        );

        let input = line_editor.read_line(&prompt);

        match input {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut fs) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, command::Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command. Type 'help' for command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting FatFS...".yellow());
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    // 退出前兜底把 FAT 刷回磁盘
    if let Err(e) = fs.sync() {
        println!("{} {}", "❌ Error flushing FAT:".red().bold(), e);
    }
    println!("{}", "GoodBye!".bright_yellow());
}

/// 启动动画 + 真实的磁盘初始化：
/// 初始化在工作线程里跑，进度通过 channel 回传驱动进度条。
fn boot() -> Option<FileSystem<FileDisk>> {
    let mut stdout = stdout();

    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0)).unwrap();
    println!("{}", "[FatFS Booting...]".bright_yellow().bold());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || perform_disk_initialization(tx));

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut ready = None;
    for progress in rx {
        match progress {
            BootProgress::Step(step) => pb.set_message(step),
            BootProgress::Progress(pos) => pb.set_position(pos),
            BootProgress::Finished(Ok(fs)) => {
                pb.set_position(100);
                pb.finish_with_message("✅ Ready!");
                ready = Some(fs);
                break;
            }
            BootProgress::Finished(Err(e)) => {
                pb.abandon_with_message("❌ Boot failed");
                println!("{} {}", "❌ Error:".red().bold(), e);
                break;
            }
        }
    }

    if ready.is_some() {
        execute!(
            stdout,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            Print(format!(
                "Welcome to FatFS v0.1.0  (booted {})\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M")
            )),
            ResetColor
        )
        .unwrap();
    }
    ready
}
