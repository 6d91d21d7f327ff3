use thiserror::Error;

/// Failure of a call through the API gateway.
///
/// `Display` renders the French message shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Impossible de joindre le serveur. Vérifiez votre connexion.")]
    Network(String),

    #[error("{0}")]
    Validation(String),

    #[error("Votre session a expiré. Veuillez vous reconnecter.")]
    Unauthorized,

    #[error("Vous n'avez pas les droits nécessaires pour effectuer cette action.")]
    Forbidden,

    #[error("La ressource demandée est introuvable.")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Erreur interne du serveur. Veuillez réessayer plus tard.")]
    Server,

    #[error("{message}")]
    Unexpected { status: u16, message: String },

    #[error("Réponse du serveur illisible : {0}")]
    Decode(String),
}

impl ApiError {
    /// Maps a non-2xx status and the optional `message` of its JSON body.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.filter(|m| !m.trim().is_empty());
        match status {
            400 => ApiError::Validation(
                message.unwrap_or_else(|| "Les données envoyées sont invalides.".to_string()),
            ),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            409 => ApiError::Conflict(message.unwrap_or_else(|| {
                "Cette opération entre en conflit avec des données existantes.".to_string()
            })),
            422 => ApiError::Unprocessable(
                message.unwrap_or_else(|| "Le format des données est incorrect.".to_string()),
            ),
            500 => ApiError::Server,
            _ => ApiError::Unexpected {
                status,
                message: message
                    .unwrap_or_else(|| "Une erreur inattendue est survenue.".to_string()),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation(_) => Some(400),
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::NotFound => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::Unprocessable(_) => Some(422),
            ApiError::Server => Some(500),
            ApiError::Unexpected { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Failure of the local preference storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to build http client: {0}")]
    HttpClient(String),
}
