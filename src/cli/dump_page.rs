use std::io::Write;

use crate::cli::wprintln;
use crate::jet::channel::PageChannel;
use crate::jet::codec::IdentityCodec;
use crate::util::hex::hex_dump;
use crate::JetError;

/// Options for the `jetutil dump-page` subcommand.
pub struct DumpPageOptions {
    pub file: String,
    pub page: u64,
}

/// Hex dump one raw, decoded page.
pub fn execute(opts: &DumpPageOptions, writer: &mut dyn Write) -> Result<(), JetError> {
    let mut channel = PageChannel::open(&opts.file, true, false, Box::new(IdentityCodec))?;
    let data = channel.read_page(opts.page)?;
    wprintln!(writer, "page {} ({} bytes):", opts.page, data.len())?;
    wprintln!(writer, "{}", hex_dump(&data, opts.page * data.len() as u64))?;
    Ok(())
}
