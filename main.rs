//! Allinpay gateway command-line client
//!
//! Signs and sends a single gateway call, or encrypts and decrypts sensitive
//! fields, using credentials read from `ALLINPAY_*` environment variables.
//!
//! ## Usage
//!
//! ```text
//! allinpay request <method> <json>
//! allinpay encrypt <text>
//! allinpay decrypt <hex>
//! ```

use std::env;
use std::process;

use rust_allinpay::{
    types::env_vars, AllinpayClient, AllinpayError, ClientConfig, Result, SensitiveInfoCipher,
};

/// A parsed command line
#[derive(Debug, PartialEq)]
enum Command {
    Request { method: String, content: String },
    Encrypt { text: String },
    Decrypt { hex: String },
}

impl Command {
    fn parse(args: &[String]) -> Option<Self> {
        match args {
            [cmd, method, content] if cmd == "request" => Some(Command::Request {
                method: method.clone(),
                content: content.clone(),
            }),
            [cmd, text] if cmd == "encrypt" => Some(Command::Encrypt { text: text.clone() }),
            [cmd, hex] if cmd == "decrypt" => Some(Command::Decrypt { hex: hex.clone() }),
            _ => None,
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("   allinpay request <method> <json>  - Sign and send a gateway call");
    eprintln!("   allinpay encrypt <text>           - Encrypt a sensitive field");
    eprintln!("   allinpay decrypt <hex>            - Decrypt a sensitive field");
    eprintln!("\nEnvironment variables:");
    eprintln!("   {} - Application identifier", env_vars::APP_ID);
    eprintln!("   {} - Secret for sensitive fields", env_vars::APP_SECRET_KEY);
    eprintln!("   {} - Application account id", env_vars::APP_ACCOUNT_ID);
    eprintln!("   {} - PKCS#12 key container", env_vars::PFX_PATH);
    eprintln!("   {} - Key container password", env_vars::PFX_PASSWORD);
    eprintln!("   {} - Gateway certificate (PEM)", env_vars::TL_CERT_PATH);
    eprintln!("   {} - Use the production gateway (default: false)", env_vars::PRODUCTION);
    eprintln!("   {} - Interface version (default: 1.0)", env_vars::VERSION);
    eprintln!("   {} - Notification URL", env_vars::NOTIFY_URL);
    eprintln!("   {} - Explicit gateway URL", env_vars::SERVICE_URL);
    eprintln!("   {} - Request timeout in seconds", env_vars::TIMEOUT_SECS);
}

async fn run(command: Command) -> Result<String> {
    let config = ClientConfig::from_env()?;

    match command {
        Command::Request { method, content } => {
            let content: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
                AllinpayError::payload_serialization(format!("Invalid JSON content: {}", e))
            })?;
            let client = AllinpayClient::new(config)?;
            let response = client.request(&method, &content).await?;
            Ok(serde_json::to_string_pretty(response.fields())?)
        }
        // Field encryption only needs the app secret, not the key files
        Command::Encrypt { text } => {
            SensitiveInfoCipher::from_secret(&config.app_secret_key)?.encrypt_to_hex(&text)
        }
        Command::Decrypt { hex } => {
            SensitiveInfoCipher::from_secret(&config.app_secret_key)?.decrypt_hex(&hex)
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = Command::parse(&args) else {
        print_usage();
        process::exit(2);
    };

    match run(command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
