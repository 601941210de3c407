use std::fmt;

use reqwest::StatusCode;

/// Backend capability an error or log line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListDiscussions,
    GetDiscussion,
    CreateDiscussion,
    Vote,
    CreateComment,
    ToggleLike,
    IncrementVisitor,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::ListDiscussions => "list_discussions",
            Operation::GetDiscussion => "get_discussion",
            Operation::CreateDiscussion => "create_discussion",
            Operation::Vote => "vote",
            Operation::CreateComment => "create_comment",
            Operation::ToggleLike => "toggle_like",
            Operation::IncrementVisitor => "increment_visitor",
        }
    }

    /// What a 404 means for this operation.
    pub fn not_found_message(self) -> &'static str {
        match self {
            Operation::ToggleLike => "댓글을 찾을 수 없습니다",
            _ => "토론을 찾을 수 없습니다",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("네트워크 오류: {method} {url}")]
    Network {
        method: reqwest::Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}", .operation.not_found_message())]
    NotFound { operation: Operation },

    #[error("잘못된 요청입니다. 필수 항목을 확인해주세요.")]
    BadRequest,

    #[error("서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.")]
    ServerError,

    #[error("{operation} 요청에 실패했습니다: {status}")]
    UnknownStatus {
        operation: Operation,
        status: StatusCode,
    },

    #[error("서버 응답 형식이 올바르지 않습니다. ({operation})")]
    MalformedBody { operation: Operation },

    #[error("잘못된 주소입니다: {0}")]
    InvalidUrl(String),

    #[error("HTTP 클라이언트를 만들 수 없습니다")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Maps a non-2xx status to the error the caller sees.
    pub fn from_status(operation: Operation, status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound { operation },
            StatusCode::BAD_REQUEST => ApiError::BadRequest,
            StatusCode::INTERNAL_SERVER_ERROR => ApiError::ServerError,
            status => ApiError::UnknownStatus { operation, status },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
