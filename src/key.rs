//! # Private key loading
//!
//! Turns the passphrase-protected PEM key issued with the app into a [SigningIdentity].
use jsonwebtoken::{Algorithm, EncodingKey};
use openssl::pkey::{Id, PKey};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyDecodeError {
    #[error("unable to decrypt private key: `{0}`")]
    Decrypt(String),
    #[error("private key is not an RSA key, found `{0}`")]
    NotRsa(String),
    #[error("invalid RSA private key: `{0}`")]
    InvalidKey(String),
    #[error("unable to read private key file `{path}`: `{err}`")]
    Io { path: String, err: String },
}

/// RSA private key ready to sign assertions, together with the algorithm used to sign them.
pub struct SigningIdentity {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

impl SigningIdentity {
    /// Decrypts `pem` with `passphrase`.
    ///
    /// Both PKCS#8 (`ENCRYPTED PRIVATE KEY`) and traditional OpenSSL (`RSA PRIVATE KEY` with
    /// `Proc-Type: 4,ENCRYPTED`) encodings are accepted.
    pub fn try_from_encrypted_pem(pem: &[u8], passphrase: &[u8]) -> Result<Self, KeyDecodeError> {
        let pem = sanitize_pem(pem);

        let pkey = PKey::private_key_from_pem_passphrase(&pem, passphrase)
            .map_err(|e| KeyDecodeError::Decrypt(e.to_string()))?;

        if pkey.id() != Id::RSA {
            return Err(KeyDecodeError::NotRsa(key_type_name(pkey.id())));
        }

        let rsa = pkey
            .rsa()
            .map_err(|e| KeyDecodeError::InvalidKey(e.to_string()))?;
        match rsa.check_key() {
            Ok(true) => {}
            Ok(false) => {
                return Err(KeyDecodeError::InvalidKey(
                    "key consistency check failed".to_owned(),
                ))
            }
            Err(e) => return Err(KeyDecodeError::InvalidKey(e.to_string())),
        }

        // PKCS#1 DER only lives for the duration of this call.
        let der = rsa
            .private_key_to_der()
            .map_err(|e| KeyDecodeError::InvalidKey(e.to_string()))?;

        Ok(Self {
            encoding_key: EncodingKey::from_rsa_der(&der),
            algorithm: Algorithm::RS256,
        })
    }

    /// Reads the PEM at `path` and decrypts it with `passphrase`.
    pub fn try_from_encrypted_pem_file(
        path: &Path,
        passphrase: &[u8],
    ) -> Result<Self, KeyDecodeError> {
        let pem = std::fs::read(path).map_err(|err| KeyDecodeError::Io {
            path: path.to_string_lossy().into(),
            err: err.to_string(),
        })?;
        Self::try_from_encrypted_pem(&pem, passphrase)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Keys copied into config files or env vars usually come with escaped line breaks.
fn sanitize_pem(pem: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(pem)
        .replace("\\n", "\n")
        .trim()
        .as_bytes()
        .to_vec()
}

fn key_type_name(id: Id) -> String {
    match id {
        Id::EC => "EC".to_owned(),
        Id::DSA => "DSA".to_owned(),
        Id::DH => "DH".to_owned(),
        Id::ED25519 => "Ed25519".to_owned(),
        Id::ED448 => "Ed448".to_owned(),
        other => format!("unknown key type ({})", other.as_raw()),
    }
}
