//! Upload of result files to an FTP drop.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use suppaftp::FtpStream;
use tracing::info;

use crate::config::FtpConfig;

/// Uploads one file to the FTP server, stored under its base file name.
pub fn upload_file(path: &Path, ftp: &FtpConfig) -> Result<()> {
    info!("Connecting to FTP '{}'...", ftp.host);
    let mut stream = FtpStream::connect(format!("{}:21", ftp.host))
        .with_context(|| format!("FTP '{}' open connection failed", ftp.host))?;
    stream
        .login(&ftp.user, &ftp.password)
        .with_context(|| format!("FTP '{}' login failed", ftp.host))?;

    let remote_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("file '{}' has no base name", path.display()))?;
    let mut file = File::open(path)
        .with_context(|| format!("open file '{}' failed", path.display()))?;

    info!("Uploading '{}' as '{remote_name}'", path.display());
    stream
        .put_file(remote_name, &mut file)
        .with_context(|| format!("upload of '{}' to FTP '{}' failed", path.display(), ftp.host))?;
    stream
        .quit()
        .with_context(|| format!("FTP '{}' close connection failed", ftp.host))?;

    info!("File '{}' saved on FTP", path.display());
    Ok(())
}
