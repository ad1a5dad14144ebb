use base64::{
    Engine as _,
    alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE_NO_PAD,
    },
};
use ring::rand::SecureRandom;
use std::time::Duration;
use thiserror::Error;

use crate::config::EVILOAUTH_HTTP_TIMEOUT_SECS;

/// base64url engine that accepts both padded and unpadded input.
///
/// JWT segments are unpadded, but captured strings occasionally arrive with
/// trailing `=`; both shapes must decode to the same bytes.
const URL_SAFE_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_INDIFFERENT
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(bytes))
}

/// HTTP client shared by the token exchange and the modules.
pub(crate) fn get_client() -> Result<reqwest::Client, UtilError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(*EVILOAUTH_HTTP_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| UtilError::Http(e.to_string()))
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}
