//! 路径参数提取器
//!
//! 把 `{xxx_id}` 解析为正整数，失败时直接返回 400 响应。

use actix_web::HttpRequest;

use crate::errors::GradebookError;

/// 读取并校验路径中的正整数 ID
pub fn parse_positive_id(req: &HttpRequest, name: &str) -> Result<i64, GradebookError> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| GradebookError::validation(format!("Missing path parameter: {name}")))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(GradebookError::validation(format!(
            "Invalid {name}: must be a positive integer"
        ))),
    }
}

#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl actix_web::FromRequest for $name {
                type Error = actix_web::Error;
                type Future = std::future::Ready<Result<Self, Self::Error>>;

                fn from_request(
                    req: &actix_web::HttpRequest,
                    _payload: &mut actix_web::dev::Payload,
                ) -> Self::Future {
                    std::future::ready(
                        $crate::utils::extractor::parse_positive_id(req, $param)
                            .map($name)
                            .map_err(actix_web::Error::from),
                    )
                }
            }
        )*
    };
}

define_safe_i64_extractor! {
    SafeGroupId => "group_id",
    SafeTaskId => "task_id",
    SafeAppealId => "appeal_id",
    SafeStudentId => "student_id",
    SafeUserId => "user_id",
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn request_with(param: &str, value: &str) -> HttpRequest {
        TestRequest::default()
            .param(param.to_string(), value.to_string())
            .to_http_request()
    }

    #[test]
    fn test_positive_id_accepted() {
        let req = request_with("group_id", "42");
        assert_eq!(parse_positive_id(&req, "group_id").unwrap(), 42);
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        assert!(parse_positive_id(&request_with("task_id", "0"), "task_id").is_err());
        assert!(parse_positive_id(&request_with("task_id", "-3"), "task_id").is_err());
        assert!(parse_positive_id(&request_with("task_id", "abc"), "task_id").is_err());
        assert!(parse_positive_id(&request_with("task_id", "1"), "group_id").is_err());
    }
}
