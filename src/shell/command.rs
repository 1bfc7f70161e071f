use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    error::Error,
    io::{self, Write},
};

use crate::{
    disk::BlockDevice,
    fs::{dir_entry::EntryKind, error::FileSystemError, FileSystem},
};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Format,
    Create(String),
    Cat(String),
    Ls,
    Cp(String, String),
    Mv(String, String),
    Rm(String),
    Append(String, String),
    Mkdir(String),
    Cd(String),
    Pwd,
    Chmod(String, String),
    Exit,
}

pub fn execute_command<D: BlockDevice>(
    cmd: &Command,
    fs: &mut FileSystem<D>,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Format => {
            println!("💾 Formatting virtual disk...");
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::with_template("[{bar:40.green/black}] {pos:>3}% {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            fs.format()?;
            pb.set_position(100);
            pb.finish_with_message("✅ Disk formatted successfully!");
        }
        Command::Create(path) => {
            let content = read_content()?;
            fs.create(path, &content)?;
            println!("📝 Created file: {}", path.green());
        }
        Command::Cat(path) => {
            let bytes = fs.cat(path)?;
            print!("{}", String::from_utf8_lossy(&bytes));
            io::stdout().flush()?;
        }
        Command::Ls => {
            println!(
                "{:<24} {:<6} {:<7} {}",
                "name".bold(),
                "type".bold(),
                "rights".bold(),
                "size".bold()
            );
            for entry in fs.ls()? {
                match entry.kind {
                    EntryKind::Directory => println!(
                        "📁 {:<21} {:<6} {:<7} -",
                        entry.name.blue().bold(),
                        "dir",
                        entry.rights.symbolic()
                    ),
                    EntryKind::File => println!(
                        "📄 {:<21} {:<6} {:<7} {}",
                        entry.name,
                        "file",
                        entry.rights.symbolic(),
                        entry.size
                    ),
                }
            }
        }
        Command::Cp(src, dst) => {
            fs.cp(src, dst)?;
            println!("📋 Copied {} -> {}", src.cyan(), dst.green());
        }
        Command::Mv(src, dst) => {
            fs.mv(src, dst)?;
            println!("🚚 Moved {} -> {}", src.cyan(), dst.green());
        }
        Command::Rm(path) => {
            fs.rm(path)?;
            println!("🗑️ Removed: {}", path.red());
        }
        Command::Append(src, dst) => {
            fs.append(src, dst)?;
            println!("➕ Appended {} to {}", src.cyan(), dst.green());
        }
        Command::Mkdir(path) => {
            fs.mkdir(path)?;
            println!("✅ Created directory: {}", path.green());
        }
        Command::Cd(path) => {
            fs.cd(path)?;
            println!("📂 Moved to {}", fs.pwd().blue());
        }
        Command::Pwd => println!("📍 {}", fs.pwd().cyan()),
        Command::Chmod(rights, path) => {
            let value: u8 = rights
                .parse()
                .map_err(|_| FileSystemError::InvalidRights(rights.clone()))?;
            fs.chmod(value, path)?;
            println!("🔐 Changed rights of {} to {}", path.cyan(), rights.green());
        }
        Command::Exit => {
            fs.sync()?;
            println!("{}", "👋 Exiting FatFS shell...".yellow().bold());
        }
    }

    Ok(())
}

/// create 的内容输入：按行读取，空行结束，每行以换行符收尾
fn read_content() -> Result<Vec<u8>, Box<dyn Error>> {
    println!(
        "{}",
        "Enter file content (end with an empty line):".bright_black()
    );
    let mut content = String::new();
    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()?;
        if line.is_empty() {
            break;
        }
        content.push_str(&line);
        content.push('\n');
    }
    Ok(content.into_bytes())
}

fn print_help() {
    println!("{}", "📘 FatFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  format             Format the virtual disk (erases everything)
  create <path>      Create a file, content follows until an empty line
  cat <path>         Print a file's content
  ls                 List the current directory
  cp <src> <dst>     Copy a file (into a directory, or under a new name)
  mv <src> <dst>     Move or rename a file or directory
  rm <path>          Remove a file, or an empty directory
  append <src> <dst> Append src's content to the end of dst
  mkdir <path>       Create a directory
  cd <path>          Change the current directory
  pwd                Print the current path
  chmod <0-7> <path> Change access rights (read 4, write 2, execute 1)
  help               Show this help message
  exit               Quit the shell
"
        .bright_black()
    );
}
