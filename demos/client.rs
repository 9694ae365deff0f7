use argh::FromArgs;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use facecheck::DetectFaceRequest;
use std::path::{Path, PathBuf};

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5000;

#[derive(FromArgs)]
/// Facecheck client for sending images and checking the server
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// command to execute: "detect" or "status"
    #[argh(subcommand)]
    command: ClientCommands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum ClientCommands {
    Detect(DetectCommand),
    Status(StatusCommand),
}

#[derive(FromArgs)]
/// Check an image for exactly one face
#[argh(subcommand, name = "detect")]
struct DetectCommand {
    /// the path to the image
    #[argh(option, short = 'i')]
    image_path: PathBuf,
}

#[derive(FromArgs)]
/// Show the detector state and counters
#[argh(subcommand, name = "status")]
struct StatusCommand {}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let response = match args.command {
        ClientCommands::Detect(detect_command) => {
            let bytes = std::fs::read(&detect_command.image_path)?;
            let image = format!(
                "data:{};base64,{}",
                mime_type(&detect_command.image_path),
                STANDARD.encode(bytes)
            );

            client
                .post(format!("http://{}/detect_face", addr))
                .json(&DetectFaceRequest { image })
                .send()
                .await?
        }
        ClientCommands::Status(_) => {
            client
                .get(format!("http://{}/status", addr))
                .send()
                .await?
        }
    };

    println!("Status: {}", response.status());
    let result = response.json::<serde_json::Value>().await?;
    println!("Result: {}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
