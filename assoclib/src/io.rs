use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use crate::config::SweepConfig;
use crate::trace::parse_trace;

/// Reads the whole of a trace into memory. Works for pipes and other streams which can't be mapped
pub fn read_trace_bytes(mut file: File) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|e| format!("Couldn't read the trace file: {e}"))?;
    Ok(buf)
}

/// Gets the bytes of a regular trace file, ready for parsing
pub fn get_trace_bytes(file: File) -> Result<impl AsRef<[u8]>, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        read_trace_bytes(file)
    }
    // Memory map the file on unix systems, the parser only ever walks it front to back
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(m)
        }
    }
}

/// Opens and parses a trace into its addresses
///
/// Regular files are memory mapped. Anything else, such as a FIFO or `/dev/stdin`, reports no
/// length up front and is read to the end instead
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<u64>, String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", path.display()))?;
    let metadata = file.metadata().map_err(|e| format!("Couldn't read trace file metadata: {e}"))?;
    let parsed = if metadata.is_file() {
        // Mapping an empty file fails on some platforms, and there is nothing to parse anyway
        if metadata.len() == 0 {
            return Ok(Vec::new());
        }
        let bytes = get_trace_bytes(file)?;
        parse_trace(bytes.as_ref())
    } else {
        parse_trace(&read_trace_bytes(file)?)
    };
    let addresses = parsed.map_err(|e| format!("Couldn't parse the trace file {}: {e}", path.display()))?;
    log::debug!("Loaded {} addresses from {}", addresses.len(), path.display());
    Ok(addresses)
}

/// Reads a JSON sweep configuration, any missing field takes its default
pub fn load_sweep_config(path: impl AsRef<Path>) -> Result<SweepConfig, String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {}: {e}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("Couldn't parse the config file: {e}"))
}
