use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use log::debug;
use crate::config::parse_addresses;

pub fn get_reader(file: File) -> Result<impl Read + Seek, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        Ok(BufReader::new(file))
    }
    // Memory map the file on unix systems, address files are read once front to back
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(Cursor::new(m))
        }
    }
}

/// Reads an address list from a file, separated by commas or line breaks
pub fn read_addresses(path: &Path) -> Result<Vec<u64>, String> {
    let file = File::open(path).map_err(|e| format!("Couldn't open the address file at path {}: {e}", path.display()))?;
    let length = file.metadata().map_err(|e| format!("Couldn't read the metadata of {}: {e}", path.display()))?.len();
    // Empty files can't be mapped
    if length == 0 {
        return Ok(Vec::new());
    }
    let mut text = String::with_capacity(length as usize);
    get_reader(file)?
        .read_to_string(&mut text)
        .map_err(|e| format!("Couldn't read the address file {}: {e}", path.display()))?;
    let addresses = parse_addresses(&text).map_err(|e| format!("Couldn't parse the address file {}: {e}", path.display()))?;
    debug!("Read {} addresses from {}", addresses.len(), path.display());
    Ok(addresses)
}
