//! Decode an audio asset and print a summary.
//!
//! Run with:
//! ```bash
//! # Ogg Vorbis through the streaming pipeline
//! cargo run -p core-decode --example decode_asset -- assets/theme.ogg
//!
//! # Anything else through the flat loader, JSON logs
//! cargo run -p core-decode --example decode_asset -- assets/hit.wav json
//! ```

use core_decode::{AudioAssetDecoder, AudioBuffer, FlatAssetDecoder, VorbisAssetDecoder};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::sink::LogLevel;
use std::env;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("usage: decode_asset <file> [pretty|json|compact]");
        return ExitCode::FAILURE;
    };

    let format = match args.get(2).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };
    let config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug);
    if let Err(e) = init_logging(config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let path = Path::new(path);
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    match decode(path) {
        Ok(buffer) => {
            info!(
                file = %file_name,
                frames = buffer.frame_count(),
                channels = buffer.channel_count(),
                sample_rate = buffer.sample_rate(),
                layout = ?buffer.layout(),
                source_format = ?buffer.format().source_format,
                duration = ?buffer.duration(),
                "Decoded asset"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(file = %file_name, "Decode failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn decode(path: &Path) -> core_decode::Result<AudioBuffer> {
    let mut file = File::open(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("ogg") | Some("oga") => VorbisAssetDecoder::new().decode(&mut file),
        Some(ext) => FlatAssetDecoder::new()
            .with_extension(ext)
            .decode(&mut file),
        None => FlatAssetDecoder::new().decode(&mut file),
    }
}
