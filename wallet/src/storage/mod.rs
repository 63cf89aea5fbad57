pub mod paths;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::errors::WalletResult;

pub use paths::WalletPaths;

/// Write `bytes` to a sibling temp file, sync it, then rename it over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> WalletResult<()> {
    let tmp_path = path.with_extension("new");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}
