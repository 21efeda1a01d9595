use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Result;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// The stack file to use: the one given on the command line, else the
/// configured default.
pub fn resolve_stack_path(stack: Option<String>) -> Result<Utf8PathBuf> {
    let path = match stack {
        Some(path) => Utf8PathBuf::from(path),
        None => config::load_config().default_stack.ok_or(CliError::NoStack)?,
    };
    ensure_stack_exists(&path)?;
    Ok(path)
}

fn ensure_stack_exists(path: &Utf8Path) -> Result<()> {
    if !path.is_file() {
        return Err(CliError::stack_not_found(path.to_path_buf()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_stack_must_exist() {
        let dir = tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("lumpstack.toml")).unwrap();
        assert!(resolve_stack_path(Some(path.to_string())).is_err());

        fs::write(&path, "").unwrap();
        assert_eq!(resolve_stack_path(Some(path.to_string())).unwrap(), path);
    }
}
