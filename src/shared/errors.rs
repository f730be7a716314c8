//! Error types shared across the crate

use thiserror::Error;

/// Lower-cased fragments that mark a backend failure as an
/// authentication problem rather than a transient one.
const AUTH_ERROR_MARKERS: &[&str] = &[
    "401",
    "unauthorized",
    "access denied",
    "accessdenied",
    "invalid credentials",
    "invalid token",
    "token belongs",
];

/// Failures raised by the HTTP gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Errore di rete: {0}")]
    Transport(String),

    #[error("Risposta non valida: {0}")]
    Decode(String),

    #[error("URL non valido: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether this failure invalidates the cached session.
    ///
    /// Ambiguous failures (network, decode) must NOT log the user out;
    /// only responses carrying an authentication signal do.
    pub fn is_auth_error(&self) -> bool {
        match self {
            ApiError::Status { status: 401, .. } => true,
            ApiError::Status { message, .. } => {
                let msg = message.to_lowercase();
                AUTH_ERROR_MARKERS.iter().any(|m| msg.contains(m))
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures raised by the session resolver.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Risposta login senza token valido")]
    MissingLoginToken,

    #[error("Credenziali non valide: {0}")]
    Validation(String),

    #[error("Cache sessione non disponibile: {0}")]
    Store(String),
}

impl SessionError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SessionError::Api(api) if api.is_auth_error())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Failures raised by the spreadsheet import pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Formato non supportato. Carica .xlsx / .xls / .csv")]
    UnsupportedFormat,

    #[error("Intestazioni mancanti nel file: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Lettura file non riuscita: {0}")]
    Read(String),

    #[error("Tecnico non valido (ID). Seleziona un tecnico dall'elenco.")]
    InvalidTechnician,

    #[error("Carica un file con almeno una riga.")]
    EmptyBatch,

    #[error("Correggi gli errori evidenziati prima di importare.")]
    RowIssues,
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Failures raised when building a work declaration.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("Inserisci almeno una lavorazione.")]
    NoItems,
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ── Tests ──────────────────────────────────────────────────────
