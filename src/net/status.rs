//! Status code wording.

/// Reason phrase for the status codes legacy consumers know about.
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown Status",
    }
}

/// Warning text for an HTTP error status, as shown to the page user.
pub fn http_error_message(status: u16) -> String {
    match status {
        400 => "请求参数错误 (400)".to_string(),
        401 => "未授权，请检查认证信息 (401)".to_string(),
        403 => "访问被拒绝 (403)".to_string(),
        404 => "请求的资源不存在 (404)".to_string(),
        500 => "服务器内部错误 (500)".to_string(),
        502 => "网关错误 (502)".to_string(),
        503 => "服务暂时不可用 (503)".to_string(),
        other => format!("HTTP {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(status_text(200), "OK");
        assert_eq!(status_text(422), "Unprocessable Entity");
        assert_eq!(status_text(418), "Unknown Status");
    }

    #[test]
    fn error_messages_fall_back_to_code() {
        assert_eq!(http_error_message(404), "请求的资源不存在 (404)");
        assert_eq!(http_error_message(418), "HTTP 418");
    }
}
