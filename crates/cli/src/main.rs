// MPL-2.0: https://mozilla.org/MPL/2.0/

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chunkvault_core::config::{CodecConfig, Encoding};
use chunkvault_core::keys::{derive_subkey, generate_master, MasterSecret};
use chunkvault_core::session::{decrypt_stream, encrypt_stream};
use chunkvault_core::validate::validate_path;

#[derive(Parser, Debug)]
#[command(name = "chunkvault", version, about = "Chunked AEAD stream codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging (sets the default tracing filter to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a fresh master secret and print it as hex.
    GenerateMaster,

    /// Derive and print an object subkey (hex) from a master secret and object id.
    DeriveSubkey {
        /// Hex-encoded 32-byte master secret.
        #[arg(long)]
        master_hex: String,

        /// Object identifier to derive the subkey for.
        #[arg(long)]
        object_id: String,
    },

    /// Encrypt a file into a chunked envelope.
    Encrypt {
        /// Hex-encoded 32-byte master secret.
        #[arg(long)]
        master_hex: String,

        /// Object identifier bound into every frame's associated data.
        #[arg(long)]
        object_id: String,

        /// Input plaintext file.
        #[arg(long)]
        input: PathBuf,

        /// Output envelope file.
        #[arg(long)]
        output: PathBuf,

        /// Target plaintext bytes per frame.
        #[arg(long, default_value_t = chunkvault_core::config::DEFAULT_FRAME_SIZE)]
        frame_size: u32,

        /// Text encoding applied to the envelope on disk.
        #[arg(long, default_value = "binary")]
        encoding: String,
    },

    /// Decrypt a chunked envelope back into plaintext.
    Decrypt {
        /// Hex-encoded 32-byte master secret.
        #[arg(long)]
        master_hex: String,

        /// Object identifier the envelope was sealed under.
        #[arg(long)]
        object_id: String,

        /// Input envelope file.
        #[arg(long)]
        input: PathBuf,

        /// Output plaintext file.
        #[arg(long)]
        output: PathBuf,

        /// Text encoding the envelope on disk is stored in.
        #[arg(long, default_value = "binary")]
        encoding: String,

        /// Continue past per-frame authentication failures instead of aborting.
        #[arg(long)]
        permissive: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match cli.command {
        Command::GenerateMaster => {
            let master = generate_master();
            println!("{}", master.export());
            Ok(())
        }
        Command::DeriveSubkey {
            master_hex,
            object_id,
        } => {
            let master = MasterSecret::import(&master_hex).context("invalid master secret")?;
            let subkey = derive_subkey(&master, &object_id).context("failed to derive subkey")?;
            println!("{}", subkey.export());
            Ok(())
        }
        Command::Encrypt {
            master_hex,
            object_id,
            input,
            output,
            frame_size,
            encoding,
        } => {
            validate_path(&input).context("input path rejected")?;
            validate_path(&output).context("output path rejected")?;

            let master = MasterSecret::import(&master_hex).context("invalid master secret")?;
            let encoding = Encoding::parse(&encoding).context("invalid encoding")?;
            let config = CodecConfig::default()
                .with_frame_size(frame_size)
                .with_encoding(encoding);
            config.validate().context("invalid codec configuration")?;

            let mut reader = BufReader::new(
                File::open(&input).with_context(|| format!("failed to open {input:?}"))?,
            );
            let writer = BufWriter::new(
                File::create(&output).with_context(|| format!("failed to create {output:?}"))?,
            );

            let stats = encrypt_stream(&master, &object_id, &mut reader, writer, &config)
                .context("encryption failed")?;
            tracing::info!(
                frames = stats.frames,
                plaintext_bytes = stats.plaintext_bytes,
                "encrypted object {object_id}"
            );
            Ok(())
        }
        Command::Decrypt {
            master_hex,
            object_id,
            input,
            output,
            encoding,
            permissive,
        } => {
            validate_path(&input).context("input path rejected")?;
            validate_path(&output).context("output path rejected")?;

            let master = MasterSecret::import(&master_hex).context("invalid master secret")?;
            let encoding = Encoding::parse(&encoding).context("invalid encoding")?;
            let config = CodecConfig::default()
                .with_encoding(encoding)
                .with_permissive_decrypt(permissive);
            config.validate().context("invalid codec configuration")?;

            let reader = BufReader::new(
                File::open(&input).with_context(|| format!("failed to open {input:?}"))?,
            );
            let mut writer = BufWriter::new(
                File::create(&output).with_context(|| format!("failed to create {output:?}"))?,
            );

            let stats = decrypt_stream(&master, &object_id, reader, &mut writer, &config)
                .context("decryption failed")?;
            if !stats.failures.is_empty() {
                tracing::warn!(
                    failed_frames = stats.failures.len(),
                    "some frames failed authentication under --permissive"
                );
            }
            tracing::info!(
                frames = stats.frames,
                plaintext_bytes = stats.plaintext_bytes,
                "decrypted object {object_id}"
            );
            Ok(())
        }
    }
}
