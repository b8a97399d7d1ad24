// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Unix Platform Implementation
//!
//! POSIX implementation (Linux + macOS) using `libc` and `/proc`.

use super::{Platform, PlatformError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Unix platform implementation.
pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }

    fn total_memory_impl() -> Result<u64, PlatformError> {
        let pages = unsafe { libc::sysconf(libc::_SC_PHYS_PAGES) };
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) };
        if pages < 0 || page_size < 0 {
            return Err(PlatformError::Other("sysconf failed reading physical memory".to_string()));
        }
        Ok(pages as u64 * page_size as u64)
    }

    fn available_memory_impl() -> Result<u64, PlatformError> {
        let pages = unsafe { libc::sysconf(libc::_SC_AVPHYS_PAGES) };
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) };
        if pages < 0 || page_size < 0 {
            return Err(PlatformError::Other("sysconf failed reading available memory".to_string()));
        }
        Ok(pages as u64 * page_size as u64)
    }
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn page_size(&self) -> usize {
        let size = unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        Self::total_memory_impl()
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        Self::available_memory_impl()
    }

    fn line_separator(&self) -> &'static str {
        "\n"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        }
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn is_elevated(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError> {
        file.sync_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_at_least_one_cpu_and_a_sane_page_size() {
        let platform = UnixPlatform::new();
        assert!(platform.cpu_count() >= 1);
        let page_size = platform.page_size();
        assert!(page_size >= 512 && page_size <= 65536);
    }

    #[test]
    fn constants_match_posix() {
        let platform = UnixPlatform::new();
        assert_eq!(platform.line_separator(), "\n");
        assert_eq!(platform.path_separator(), ':');
    }

    #[test]
    fn non_executable_file_is_reported_as_such() {
        let platform = UnixPlatform::new();
        let file = std::env::temp_dir().join(format!("lakehouse-ingest-unix-platform-test-{}", std::process::id()));
        std::fs::write(&file, b"hi").unwrap();
        assert!(!platform.is_executable(&file));
        let _ = std::fs::remove_file(&file);
    }
}
