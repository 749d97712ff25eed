use std::path::PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(about = "Upload a file over HTTP and get a download link back")]
pub struct Args {
    #[clap(long, env = "HOST", default_value = "0.0.0.0")]
    pub(crate) host: String,
    #[clap(long, env = "PORT", default_value_t = 3000)]
    pub(crate) port: u16,
    /// Directory holding one file per upload.
    #[clap(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub(crate) upload_dir: PathBuf,
}
