//! Bundling shapefile sidecars into a single downloadable archive

use agrozone_core::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zip the given files into `archive_path`, storing each under its bare
/// file name.
pub fn zip_files(files: &[PathBuf], archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Export(format!("unusable file name: {}", path.display())))?;

        writer
            .start_file(name, options)
            .map_err(|e| Error::Export(format!("archive entry {} failed: {}", name, e)))?;
        let contents = std::fs::read(path)?;
        writer.write_all(&contents)?;
    }

    writer
        .finish()
        .map_err(|e| Error::Export(format!("archive finalization failed: {}", e)))?;

    Ok(())
}
