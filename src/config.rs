use crate::{backends::DEFAULT_MODEL_PATH, server::ServerConfig};
use argh::FromArgs;
use std::path::PathBuf;

// defaults for the server
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn default_model() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

#[derive(FromArgs, Debug)]
/// Facecheck answers whether exactly one face is present in an image.
pub struct FaceCheckArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    pub host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    pub port: u16,

    /// path to the face detection model
    #[argh(option, short = 'm', default = "default_model()")]
    pub model: PathBuf,

    /// largest accepted request body, in bytes
    #[argh(option, default = "DEFAULT_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
}

impl FaceCheckArgs {
    /// Address to bind, as `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_body_bytes: self.max_body_bytes,
        }
    }
}
