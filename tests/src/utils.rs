use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// Held while a fake tool is written and run, so no concurrently forked child
// keeps the script open for writing (ETXTBSY).
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// An executable shell script standing in for the scan tool.
pub struct FakeTool {
    pub path: PathBuf,
    _guard: MutexGuard<'static, ()>,
}

impl FakeTool {
    pub fn new(dir: &Path, body: &str) -> Self {
        let guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = dir.join("fake-nmap");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            path,
            _guard: guard,
        }
    }

    /// A tool that prints `output` verbatim, whatever it is asked to scan.
    pub fn printing(dir: &Path, output: &str) -> Self {
        let data = dir.join("canned-output.txt");
        std::fs::write(&data, output).unwrap();
        Self::new(dir, &format!("cat '{}'", data.display()))
    }

    pub fn name(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}
