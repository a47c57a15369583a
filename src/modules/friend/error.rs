use crate::api::error;

pub const PAIR_CONSTRAINT: &str = "uq_friend_requests_pair";
pub const NOT_SELF_CONSTRAINT: &str = "ck_friend_requests_not_self";

#[derive(thiserror::Error, Debug)]
pub enum FriendRequestError {
    #[error("You cannot send a friend request to yourself.")]
    SelfRequest,
    #[error("A friend request from this user to the specified user already exists.")]
    DuplicateRequest,
    #[error("The specified user does not exist.")]
    RecipientNotFound,
    #[error("You cannot send more than {limit} requests within {window_secs} seconds.")]
    RateLimited { limit: usize, window_secs: i64, retry_after: u64 },
    #[error("Friend request not found.")]
    NotFound,
    #[error("Invalid status.")]
    InvalidStatus,
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("This friend request has already been answered.")]
    InvalidTransition,
    #[error(transparent)]
    System(#[from] error::SystemError),
}

impl From<sqlx::Error> for FriendRequestError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match (db_err.code().as_deref(), db_err.constraint()) {
                (Some("23505"), Some(PAIR_CONSTRAINT)) => return FriendRequestError::DuplicateRequest,
                (Some("23514"), Some(NOT_SELF_CONSTRAINT)) => return FriendRequestError::SelfRequest,
                (Some("23503"), _) => return FriendRequestError::RecipientNotFound,
                _ => {}
            }
        }
        FriendRequestError::System(err.into())
    }
}

// Authorization and state failures answer 400 rather than 403/409 to stay
// compatible with existing clients.
impl From<FriendRequestError> for error::Error {
    fn from(value: FriendRequestError) -> Self {
        match value {
            FriendRequestError::RateLimited { retry_after, .. } => {
                error::Error::too_many_requests(value.to_string(), retry_after)
            }
            FriendRequestError::NotFound => error::Error::not_found(value.to_string()),
            FriendRequestError::System(err) => err.into(),
            FriendRequestError::SelfRequest
            | FriendRequestError::DuplicateRequest
            | FriendRequestError::RecipientNotFound
            | FriendRequestError::InvalidStatus
            | FriendRequestError::Forbidden
            | FriendRequestError::InvalidTransition => error::Error::bad_request(value.to_string()),
        }
    }
}
