//! User-facing terminal output.
//! Status lines carry a colored prefix when the stream they go to is a TTY;
//! primary results (paths, numbers) go to stdout unadorned so scripts can
//! consume them.

use owo_colors::OwoColorize;

fn stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// Aligned `key: value` line for reports such as disk space.
pub fn print_kv(key: &str, value: &str) {
    if stdout_tty() {
        println!("{} {}", format!("{key:>9}:").bold(), value);
    } else {
        println!("{key}: {value}");
    }
}

/// Plain line with no prefix, for output users may script against.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
