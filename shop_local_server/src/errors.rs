use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shop_local_engine::{AccountApiError, CatalogApiError, OrderFlowError, ReviewApiError, ShopApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The order was rejected. {0}")]
    OrderRejected(String),
    #[error("Conflict. {0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::OrderRejected(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "message": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Could not hash the password. {0}")]
    HashingError(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        use OrderFlowError::*;
        match e {
            OrderNotFound(_) | ShopNotFound(_) | ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            EmptyOrder | InvalidQuantity | ProductNotInShop { .. } | TotalMismatch { .. } => {
                Self::OrderRejected(e.to_string())
            },
            InvalidTransition { .. } => Self::OrderRejected(e.to_string()),
            RoleNotAllowed(_) | NotOrderOwner | NotShopOwner | CancelNotPending => {
                Self::InsufficientPermissions(e.to_string())
            },
            ConcurrentUpdate(_) => Self::Conflict(e.to_string()),
            DatabaseError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ShopApiError> for ServerError {
    fn from(e: ShopApiError) -> Self {
        use ShopApiError::*;
        match e {
            ShopNotFound(_) | CategoryNotFound(_) => Self::NoRecordFound(e.to_string()),
            ShopNotVisible(_) | NotShopOwner => Self::InsufficientPermissions(e.to_string()),
            DatabaseError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        use CatalogApiError::*;
        match e {
            ShopNotFound(_) | ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            NotShopOwner => Self::InsufficientPermissions(e.to_string()),
            DatabaseError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ReviewApiError> for ServerError {
    fn from(e: ReviewApiError) -> Self {
        use ReviewApiError::*;
        match e {
            ShopNotFound(_) => Self::NoRecordFound(e.to_string()),
            InvalidRating(_) | OrderMismatch | OrderNotDelivered => Self::InvalidRequestBody(e.to_string()),
            DatabaseError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        use AccountApiError::*;
        match e {
            UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            DuplicateAccount => Self::Conflict(e.to_string()),
            DatabaseError(e) => Self::BackendError(e.to_string()),
        }
    }
}
