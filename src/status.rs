//! HTTP status codes as a typed enum.
//!
//! Every [`Response`](crate::Response) constructor fixes its status from this
//! table, and error envelopes take their `title` from [`Status::reason`].
//!
//! ```rust
//! use restful::Status;
//!
//! assert_eq!(Status::NotFound.code(), 404);
//! assert_eq!(Status::NotFound.reason(), "Not Found");
//! assert_eq!(restful::status::reason_phrase(418), "I'm a teapot");
//! ```

/// All IANA-registered HTTP status codes, plus the deprecated `305 Use Proxy`.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 1xx Informational ─────────────────────────────────────────────────────
    Continue,
    SwitchingProtocols,
    Processing,
    EarlyHints,

    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,
    Created,
    Accepted,
    NonAuthoritativeInformation,
    NoContent,
    ResetContent,
    PartialContent,
    MultiStatus,
    AlreadyReported,
    ImUsed,

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MultipleChoices,
    MovedPermanently,
    Found,
    SeeOther,
    NotModified,
    UseProxy,
    TemporaryRedirect,
    PermanentRedirect,

    // ── 4xx Client Error ──────────────────────────────────────────────────────
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    RequestTimeout,
    Conflict,
    Gone,
    LengthRequired,
    PreconditionFailed,
    ContentTooLarge,
    UriTooLong,
    UnsupportedMediaType,
    RangeNotSatisfiable,
    ExpectationFailed,
    ImATeapot,
    MisdirectedRequest,
    UnprocessableContent,
    Locked,
    FailedDependency,
    TooEarly,
    UpgradeRequired,
    PreconditionRequired,
    TooManyRequests,
    RequestHeaderFieldsTooLarge,
    UnavailableForLegalReasons,

    // ── 5xx Server Error ──────────────────────────────────────────────────────
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    HttpVersionNotSupported,
    VariantAlsoNegotiates,
    InsufficientStorage,
    LoopDetected,
    NotExtended,
    NetworkAuthenticationRequired,
}

const ALL: [Status; 62] = [
    Status::Continue,
    Status::SwitchingProtocols,
    Status::Processing,
    Status::EarlyHints,
    Status::Ok,
    Status::Created,
    Status::Accepted,
    Status::NonAuthoritativeInformation,
    Status::NoContent,
    Status::ResetContent,
    Status::PartialContent,
    Status::MultiStatus,
    Status::AlreadyReported,
    Status::ImUsed,
    Status::MultipleChoices,
    Status::MovedPermanently,
    Status::Found,
    Status::SeeOther,
    Status::NotModified,
    Status::UseProxy,
    Status::TemporaryRedirect,
    Status::PermanentRedirect,
    Status::BadRequest,
    Status::Unauthorized,
    Status::PaymentRequired,
    Status::Forbidden,
    Status::NotFound,
    Status::MethodNotAllowed,
    Status::NotAcceptable,
    Status::ProxyAuthenticationRequired,
    Status::RequestTimeout,
    Status::Conflict,
    Status::Gone,
    Status::LengthRequired,
    Status::PreconditionFailed,
    Status::ContentTooLarge,
    Status::UriTooLong,
    Status::UnsupportedMediaType,
    Status::RangeNotSatisfiable,
    Status::ExpectationFailed,
    Status::ImATeapot,
    Status::MisdirectedRequest,
    Status::UnprocessableContent,
    Status::Locked,
    Status::FailedDependency,
    Status::TooEarly,
    Status::UpgradeRequired,
    Status::PreconditionRequired,
    Status::TooManyRequests,
    Status::RequestHeaderFieldsTooLarge,
    Status::UnavailableForLegalReasons,
    Status::InternalServerError,
    Status::NotImplemented,
    Status::BadGateway,
    Status::ServiceUnavailable,
    Status::GatewayTimeout,
    Status::HttpVersionNotSupported,
    Status::VariantAlsoNegotiates,
    Status::InsufficientStorage,
    Status::LoopDetected,
    Status::NotExtended,
    Status::NetworkAuthenticationRequired,
];

impl Status {
    /// Numeric status code, e.g. `404`.
    pub fn code(self) -> u16 {
        self.entry().0
    }

    /// Standard reason phrase, e.g. `"Not Found"`.
    pub fn reason(self) -> &'static str {
        self.entry().1
    }

    /// Reverse lookup. `None` for codes outside the registry.
    pub fn from_code(code: u16) -> Option<Self> {
        ALL.iter().copied().find(|s| s.code() == code)
    }

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.code())
    }

    pub fn is_redirect(self) -> bool {
        (300..400).contains(&self.code())
    }

    pub fn is_error(self) -> bool {
        self.code() >= 400
    }

    fn entry(self) -> (u16, &'static str) {
        match self {
            Self::Continue                      => (100, "Continue"),
            Self::SwitchingProtocols            => (101, "Switching Protocols"),
            Self::Processing                    => (102, "Processing"),
            Self::EarlyHints                    => (103, "Early Hints"),
            Self::Ok                            => (200, "OK"),
            Self::Created                       => (201, "Created"),
            Self::Accepted                      => (202, "Accepted"),
            Self::NonAuthoritativeInformation   => (203, "Non-Authoritative Information"),
            Self::NoContent                     => (204, "No Content"),
            Self::ResetContent                  => (205, "Reset Content"),
            Self::PartialContent                => (206, "Partial Content"),
            Self::MultiStatus                   => (207, "Multi-Status"),
            Self::AlreadyReported               => (208, "Already Reported"),
            Self::ImUsed                        => (226, "IM Used"),
            Self::MultipleChoices               => (300, "Multiple Choices"),
            Self::MovedPermanently              => (301, "Moved Permanently"),
            Self::Found                         => (302, "Found"),
            Self::SeeOther                      => (303, "See Other"),
            Self::NotModified                   => (304, "Not Modified"),
            Self::UseProxy                      => (305, "Use Proxy"),
            Self::TemporaryRedirect             => (307, "Temporary Redirect"),
            Self::PermanentRedirect             => (308, "Permanent Redirect"),
            Self::BadRequest                    => (400, "Bad Request"),
            Self::Unauthorized                  => (401, "Unauthorized"),
            Self::PaymentRequired               => (402, "Payment Required"),
            Self::Forbidden                     => (403, "Forbidden"),
            Self::NotFound                      => (404, "Not Found"),
            Self::MethodNotAllowed              => (405, "Method Not Allowed"),
            Self::NotAcceptable                 => (406, "Not Acceptable"),
            Self::ProxyAuthenticationRequired   => (407, "Proxy Authentication Required"),
            Self::RequestTimeout                => (408, "Request Timeout"),
            Self::Conflict                      => (409, "Conflict"),
            Self::Gone                          => (410, "Gone"),
            Self::LengthRequired                => (411, "Length Required"),
            Self::PreconditionFailed            => (412, "Precondition Failed"),
            Self::ContentTooLarge               => (413, "Request Entity Too Large"),
            Self::UriTooLong                    => (414, "Request URI Too Long"),
            Self::UnsupportedMediaType          => (415, "Unsupported Media Type"),
            Self::RangeNotSatisfiable           => (416, "Requested Range Not Satisfiable"),
            Self::ExpectationFailed             => (417, "Expectation Failed"),
            Self::ImATeapot                     => (418, "I'm a teapot"),
            Self::MisdirectedRequest            => (421, "Misdirected Request"),
            Self::UnprocessableContent          => (422, "Unprocessable Entity"),
            Self::Locked                        => (423, "Locked"),
            Self::FailedDependency              => (424, "Failed Dependency"),
            Self::TooEarly                      => (425, "Too Early"),
            Self::UpgradeRequired               => (426, "Upgrade Required"),
            Self::PreconditionRequired          => (428, "Precondition Required"),
            Self::TooManyRequests               => (429, "Too Many Requests"),
            Self::RequestHeaderFieldsTooLarge   => (431, "Request Header Fields Too Large"),
            Self::UnavailableForLegalReasons    => (451, "Unavailable For Legal Reasons"),
            Self::InternalServerError           => (500, "Internal Server Error"),
            Self::NotImplemented                => (501, "Not Implemented"),
            Self::BadGateway                    => (502, "Bad Gateway"),
            Self::ServiceUnavailable            => (503, "Service Unavailable"),
            Self::GatewayTimeout                => (504, "Gateway Timeout"),
            Self::HttpVersionNotSupported       => (505, "HTTP Version Not Supported"),
            Self::VariantAlsoNegotiates         => (506, "Variant Also Negotiates"),
            Self::InsufficientStorage           => (507, "Insufficient Storage"),
            Self::LoopDetected                  => (508, "Loop Detected"),
            Self::NotExtended                   => (510, "Not Extended"),
            Self::NetworkAuthenticationRequired => (511, "Network Authentication Required"),
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}

/// Reason phrase for a raw code; empty for unregistered codes.
pub fn reason_phrase(code: u16) -> &'static str {
    Status::from_code(code).map_or("", Status::reason)
}
