use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, BufReader, Read};
use std::path::Path;
use twox_hash::XxHash64;

const READ_CHUNK: usize = 64 * 1024;

/// XxHash64 (seed 0) of a file's full contents, streamed in chunks.
pub fn hash_file(file: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(file)?);
    let mut hasher = XxHash64::with_seed(0);
    let mut buffer = vec![0; READ_CHUNK];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.write(&buffer[..bytes_read]);
    }
    Ok(hasher.finish())
}

pub fn hash_data(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}
