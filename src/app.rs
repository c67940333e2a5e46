//! Application orchestrator.
//! Loads and merges config, initializes logging, and dispatches the subcommand
//! to the library. Failures are logged with their structured code before being
//! handed back to `main` for the user-facing message.

use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;
use tracing::{debug, error};

use safe_fileops::output as out;
use safe_fileops::{
    Config, FsOpError, TempFileOptions, check_permission, copy_file, create_temp_file, default_config_path, default_log_path,
    delete_directory, delete_file, ensure_directory_exists, format_bytes, get_space, load_config, move_directory,
    move_file, render_config_xml, safe_process, secure_delete_file, set_permissions,
};

use crate::cli::{Args, Command, PermAction};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    let (mut cfg, loaded_from) = load_config()?;
    args.apply_overrides(&mut cfg);
    cfg.validate().context("invalid settings")?;

    // Handled before logging init so the output is just the report.
    if let Command::PrintConfig = args.command {
        print_config(&cfg, loaded_from.as_deref());
        return Ok(());
    }

    let _guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
    })?;
    debug!(?args, config = ?loaded_from, "starting safe_fileops");

    let result = execute(&cfg, &args.command);
    if let Err(e) = &result {
        match e.downcast_ref::<FsOpError>() {
            Some(op) => error!(
                code = op.code(),
                kind = op.kind().as_str(),
                os_code = ?op.os_code(),
                error = %op,
                "Operation failed"
            ),
            None => error!(error = %e, "Operation failed"),
        }
    }
    result
}

fn print_config(cfg: &Config, loaded_from: Option<&Path>) {
    match (loaded_from, default_config_path()) {
        (Some(p), _) => out::print_info(&format!("Loaded config from {}", p.display())),
        (None, Some(p)) => out::print_info(&format!("No config file at {}; using defaults", p.display())),
        (None, None) => out::print_info("No config location available; using defaults"),
    }
    if cfg.log_file.is_none()
        && let Some(p) = default_log_path()
    {
        out::print_info(&format!("File logging is off; set <log_file> (e.g. {}) to enable it", p.display()));
    }
    out::print_user(render_config_xml(cfg).trim_end());
}

fn execute(cfg: &Config, command: &Command) -> Result<()> {
    match command {
        Command::Mv {
            src,
            dest,
            overwrite,
            parents,
        } => {
            let dest = move_file(src, dest, &cfg.move_options(*overwrite, *parents))?;
            out::print_user(&dest.display().to_string());
        }
        Command::Mvdir { src, dest } => {
            let dest = move_directory(src, dest)?;
            out::print_user(&dest.display().to_string());
        }
        Command::Cp {
            src,
            dest,
            overwrite,
            parents,
            no_preserve,
        } => {
            let mut opts = cfg.copy_options(*overwrite, *parents);
            if *no_preserve {
                opts.preserve_metadata = false;
            }
            let dest = copy_file(src, dest, &opts)?;
            out::print_user(&dest.display().to_string());
        }
        Command::Rm { path, secure, .. } => {
            if *secure {
                secure_delete_file(path, cfg.secure_passes)?;
                out::print_success(&format!(
                    "Securely deleted {} ({} passes)",
                    path.display(),
                    cfg.secure_passes
                ));
            } else {
                delete_file(path)?;
                out::print_success(&format!("Deleted {}", path.display()));
            }
        }
        Command::Rmdir { path, recursive } => {
            delete_directory(path, *recursive)?;
            out::print_success(&format!("Removed directory {}", path.display()));
        }
        Command::Mkdir { path } => {
            ensure_directory_exists(path)?;
            out::print_user(&path.display().to_string());
        }
        Command::Space { path, required } => {
            let info = get_space(path)?;
            for (key, bytes) in [
                ("total", info.total),
                ("used", info.used),
                ("free", info.free),
                ("available", info.available),
            ] {
                out::print_kv(key, &format!("{} ({bytes} bytes)", format_bytes(bytes)));
            }
            if let Some(required) = *required {
                if info.available < required {
                    bail!(
                        "Insufficient space on {}: need {}, available {}",
                        path.display(),
                        format_bytes(required),
                        format_bytes(info.available)
                    );
                }
                out::print_success(&format!("{} available", format_bytes(required)));
            }
        }
        Command::Process {
            src,
            dest,
            transform,
            overwrite,
            secure_delete,
            ..
        } => {
            let mut opts = cfg.process_options();
            opts.overwrite = *overwrite;
            opts.secure_delete = *secure_delete;
            let transform = *transform;
            let outcome = safe_process(src, dest, |chunk| transform.apply(chunk), &opts)?;
            if let Some(e) = &outcome.source_cleanup_error {
                out::print_warn(&format!("Output committed but source was not removed: {e}"));
            }
            out::print_user(&outcome.target.display().to_string());
        }
        Command::Temp {
            dir,
            prefix,
            suffix,
            content,
        } => {
            let opts = TempFileOptions {
                prefix: prefix.as_deref().unwrap_or(cfg.temp_prefix.as_str()),
                suffix: suffix.as_str(),
                content: content.as_deref().map(str::as_bytes),
                dir: dir.as_deref(),
            };
            let path = create_temp_file(&opts)?;
            out::print_user(&path.display().to_string());
        }
        Command::Perm { action } => match action {
            PermAction::Check { path, permission } => {
                if !check_permission(path, *permission) {
                    return Err(anyhow!("{permission:?} access not granted on {}", path.display()));
                }
                out::print_user("granted");
            }
            PermAction::Set {
                path,
                read,
                write,
                execute,
            } => {
                set_permissions(path, *read, *write, *execute)?;
                out::print_success(&format!(
                    "Set mode {:o} on {}",
                    safe_fileops::owner_mode(*read, *write, *execute),
                    path.display()
                ));
            }
        },
        // Answered in `run` before logging starts.
        Command::PrintConfig => {}
    }
    Ok(())
}
