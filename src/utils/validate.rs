use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{GradebookError, Result};
use crate::models::points::entities::PointSource;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> std::result::Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 3-32 characters of letters, numbers, underscores or hyphens",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码至少 8 位，且同时包含大小写字母与数字
pub fn validate_password(password: &str) -> std::result::Result<(), String> {
    let checks: [(bool, &str); 4] = [
        (
            password.chars().count() >= 8,
            "Password must be at least 8 characters long",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one digit",
        ),
    ];

    let errors: Vec<&str> = checks
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, msg)| *msg)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// 任务得分必须是 [0, max_points] 内的有限数
pub fn validate_task_points(points: f64, max_points: f64) -> Result<()> {
    if !points.is_finite() {
        return Err(GradebookError::validation("Points must be a finite number"));
    }
    if points < 0.0 {
        return Err(GradebookError::validation("Points must not be negative"));
    }
    if points > max_points {
        return Err(GradebookError::validation(format!(
            "Points must not exceed {max_points}"
        )));
    }
    Ok(())
}

/// 积分流水：只有额外加分允许为负
pub fn validate_point_entry(source: PointSource, points: f64) -> Result<()> {
    if !points.is_finite() {
        return Err(GradebookError::validation("Points must be a finite number"));
    }
    if points < 0.0 && source != PointSource::Extra {
        return Err(GradebookError::validation(format!(
            "Negative points are only allowed for extra entries, not {source}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a.b@uni.edu").is_ok());
        assert!(validate_email("nope@").is_err());
    }

    #[test]
    fn test_password_collects_all_failures() {
        assert!(validate_password("SecurePass123").is_ok());
        let err = validate_password("abc").unwrap_err();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("uppercase"));
        assert!(err.contains("digit"));
    }

    #[test]
    fn test_task_points_bounds() {
        assert!(validate_task_points(0.0, 100.0).is_ok());
        assert!(validate_task_points(100.0, 100.0).is_ok());
        assert!(validate_task_points(-0.5, 100.0).is_err());
        assert!(validate_task_points(100.5, 100.0).is_err());
        assert!(validate_task_points(f64::NAN, 100.0).is_err());
        assert!(validate_task_points(f64::INFINITY, 100.0).is_err());
    }

    #[test]
    fn test_negative_points_only_for_extra() {
        assert!(validate_point_entry(PointSource::Extra, -2.0).is_ok());
        assert!(validate_point_entry(PointSource::Quiz, -2.0).is_err());
        assert!(validate_point_entry(PointSource::Assignment, 8.0).is_ok());
        assert!(validate_point_entry(PointSource::Quiz, f64::NAN).is_err());
    }
}
