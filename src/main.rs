//! sealkit - Portable AES-GCM sealed data
//!
//! Usage:
//!   sealkit keygen --out <key>                          - Generate a key file
//!   sealkit encrypt --key <key> -i <in> -o <out>        - Seal a file
//!   sealkit decrypt --key <key> -i <in> -o <out>        - Open a sealed file
//!   sealkit inspect -i <in>                             - Show container framing
//!   sealkit init-config                                 - Write a default config

use clap::{Parser, Subcommand};
use sealkit::{
    config::{Config, OutputFormat},
    crypto::{AeadEngine, DecryptOptions, EncryptOptions, Envelope, Framing, KeySize, SealedData, SymmetricKey},
    Error, Result,
};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "sealkit")]
#[command(author = "sealkit Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Portable AES-GCM sealed data")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.config/sealkit/config.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random key and write it as base64
    Keygen {
        /// Key size in bits (128, 192 or 256)
        #[arg(long)]
        size: Option<u32>,

        /// Key file to write
        #[arg(long)]
        out: PathBuf,

        /// Overwrite an existing key file
        #[arg(long)]
        force: bool,
    },

    /// Encrypt a file
    Encrypt {
        /// Key file (base64)
        #[arg(long)]
        key: PathBuf,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Additional authenticated data
        #[arg(long)]
        aad: Option<String>,

        /// Nonce length in bytes
        #[arg(long)]
        nonce_length: Option<usize>,

        /// Tag length in bytes
        #[arg(long)]
        tag_length: Option<usize>,

        /// Output format
        #[arg(long, value_parser = ["raw", "encoded", "envelope"])]
        format: Option<String>,
    },

    /// Decrypt a file
    Decrypt {
        /// Key file (base64)
        #[arg(long)]
        key: PathBuf,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Additional authenticated data
        #[arg(long)]
        aad: Option<String>,

        /// Nonce length in bytes (raw and encoded input)
        #[arg(long)]
        nonce_length: Option<usize>,

        /// Tag length in bytes (raw and encoded input)
        #[arg(long)]
        tag_length: Option<usize>,

        /// Input format
        #[arg(long, value_parser = ["raw", "encoded", "envelope"])]
        format: Option<String>,
    },

    /// Show the framing of a sealed file
    Inspect {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Nonce length in bytes (raw and encoded input)
        #[arg(long)]
        nonce_length: Option<usize>,

        /// Tag length in bytes (raw and encoded input)
        #[arg(long)]
        tag_length: Option<usize>,

        /// Input format
        #[arg(long, value_parser = ["raw", "encoded", "envelope"])]
        format: Option<String>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write (defaults to --config)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Expand ~ in config path
    let config_path = expand_tilde(&cli.config);

    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    // Setup logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }

    // Run the command
    if let Err(e) = run_command(cli.command, &config, &config_path) {
        error!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run_command(command: Commands, config: &Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Keygen { size, out, force } => cmd_keygen(config, size, &out, force),

        Commands::Encrypt {
            key,
            input,
            output,
            aad,
            nonce_length,
            tag_length,
            format,
        } => {
            let framing = resolve_framing(config, nonce_length, tag_length);
            let format = resolve_format(config, format)?;
            cmd_encrypt(config, &key, &input, &output, aad, framing, format)
        }

        Commands::Decrypt {
            key,
            input,
            output,
            aad,
            nonce_length,
            tag_length,
            format,
        } => {
            let framing = resolve_framing(config, nonce_length, tag_length);
            let format = resolve_format(config, format)?;
            cmd_decrypt(config, &key, &input, &output, aad, framing, format)
        }

        Commands::Inspect {
            input,
            nonce_length,
            tag_length,
            format,
        } => {
            let framing = resolve_framing(config, nonce_length, tag_length);
            let format = resolve_format(config, format)?;
            cmd_inspect(config, &input, framing, format)
        }

        Commands::InitConfig { path } => {
            let path = path.map(|p| expand_tilde(&p)).unwrap_or_else(|| config_path.to_path_buf());
            cmd_init_config(&path)
        }
    }
}

fn cmd_keygen(config: &Config, size: Option<u32>, out: &Path, force: bool) -> Result<()> {
    let size = match size {
        Some(bits) => KeySize::from_bits(bits)?,
        None => config.key_size,
    };

    let key = SymmetricKey::generate(size)?;
    let mut text = key.to_base64();
    text.push('\n');
    write_private(out, text.as_bytes(), force)?;

    info!("Generated {} key at {:?}", size, out);
    Ok(())
}

fn cmd_encrypt(
    config: &Config,
    key_path: &Path,
    input: &Path,
    output: &Path,
    aad: Option<String>,
    framing: Framing,
    format: OutputFormat,
) -> Result<()> {
    let key = read_key(key_path)?;
    let plaintext = std::fs::read(input)?;

    let mut options = EncryptOptions::default()
        .with_nonce_length(framing.nonce_length)
        .with_tag_length(framing.tag_length);
    if let Some(aad) = aad {
        options = options.with_aad(aad.into_bytes());
    }

    let sealed = AeadEngine::new().encrypt(&plaintext, &key, &options)?;

    let bytes = match format {
        OutputFormat::Raw => sealed.combined(),
        OutputFormat::Encoded => {
            let mut text = sealed.combined_encoded(config.encoding);
            text.push('\n');
            text.into_bytes()
        }
        OutputFormat::Envelope => Envelope::seal(&sealed).to_json()?.into_bytes(),
    };
    std::fs::write(output, bytes)?;

    info!(
        "Encrypted {} bytes into {:?} ({} format, {} bytes)",
        plaintext.len(),
        output,
        format,
        sealed.combined_size()
    );
    Ok(())
}

fn cmd_decrypt(
    config: &Config,
    key_path: &Path,
    input: &Path,
    output: &Path,
    aad: Option<String>,
    framing: Framing,
    format: OutputFormat,
) -> Result<()> {
    let key = read_key(key_path)?;
    let sealed = read_sealed(config, input, framing, format)?;

    let mut options = DecryptOptions::default();
    if let Some(aad) = aad {
        options = options.with_aad(aad.into_bytes());
    }

    let plaintext = AeadEngine::new().decrypt(&sealed, &key, &options)?;
    std::fs::write(output, &plaintext)?;

    info!("Decrypted {} bytes into {:?}", plaintext.len(), output);
    Ok(())
}

fn cmd_inspect(config: &Config, input: &Path, framing: Framing, format: OutputFormat) -> Result<()> {
    let sealed = read_sealed(config, input, framing, format)?;

    println!("Sealed data: {:?}", input);
    println!("  Format:     {}", format);
    println!("  Nonce:      {} bytes", sealed.nonce_size());
    println!("  Ciphertext: {} bytes", sealed.ciphertext_size());
    println!("  Tag:        {} bytes ({} bits)", sealed.tag_size(), sealed.tag_size() * 8);
    println!("  Total:      {} bytes", sealed.combined_size());

    Ok(())
}

fn cmd_init_config(path: &Path) -> Result<()> {
    info!("Writing default configuration...");

    // Ensure config directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Config::default().save(path)?;

    info!("Configuration saved to {:?}", path);
    Ok(())
}

fn resolve_framing(config: &Config, nonce_length: Option<usize>, tag_length: Option<usize>) -> Framing {
    Framing::new(
        nonce_length.unwrap_or(config.framing.nonce_length),
        tag_length.unwrap_or(config.framing.tag_length),
    )
}

fn resolve_format(config: &Config, format: Option<String>) -> Result<OutputFormat> {
    match format {
        Some(format) => format.parse(),
        None => Ok(config.output),
    }
}

fn read_key(path: &Path) -> Result<SymmetricKey> {
    let text = zeroize::Zeroizing::new(std::fs::read_to_string(path)?);
    SymmetricKey::from_base64(&text)
}

fn read_sealed(config: &Config, input: &Path, framing: Framing, format: OutputFormat) -> Result<SealedData> {
    match format {
        // Files written by `encrypt` may hold an empty plaintext
        OutputFormat::Raw => SealedData::from_combined_allow_empty(std::fs::read(input)?, framing),
        OutputFormat::Encoded => {
            let text = std::fs::read_to_string(input)?;
            SealedData::from_combined_allow_empty(config.encoding.decode(&text)?, framing)
        }
        OutputFormat::Envelope => {
            let json = std::fs::read_to_string(input)?;
            Envelope::from_json(&json)?.open()
        }
    }
}

/// Write a file readable only by the owner
///
/// The mode is set when the file is created, so the contents are never
/// readable by others. Without `overwrite` an existing file is an error.
fn write_private(path: &Path, contents: &[u8], overwrite: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => Error::InvalidConfig(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )),
        _ => Error::Io(e),
    })?;

    // An overwritten file keeps its old mode; it is empty at this point
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if overwrite {
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
    }

    file.write_all(contents)?;
    Ok(())
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_private_creates_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys").join("a.key");

        write_private(&path, b"secret\n", false).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"secret\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_write_private_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.key");
        std::fs::write(&path, b"original").unwrap();

        let result = write_private(&path, b"replacement", false);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
    }

    #[test]
    fn test_write_private_overwrite_tightens_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.key");
        std::fs::write(&path, b"a much longer original").unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        }

        write_private(&path, b"new", true).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
