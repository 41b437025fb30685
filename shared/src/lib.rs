use serde::{Deserialize, Serialize};

pub mod date;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const TOKEN_SCHEME: &str = "Token";

/// 组装 `Authorization` 请求头的值
pub fn authorization_value(token: &str) -> String {
    format!("{} {}", TOKEN_SCHEME, token)
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 当前登录用户的档案摘要
///
/// 服务端是唯一权威：任何响应中的用户对象都整体替换本地副本，
/// 不做逐字段合并。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birthday: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserSummary {
    /// 头像占位用的姓名首字母
    pub fn initials(&self) -> String {
        let first = self.first_name.chars().next();
        let last = self.last_name.chars().next();
        match (first, last) {
            (None, None) => self
                .username
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_else(|| "U".to_string()),
            (f, l) => f
                .into_iter()
                .chain(l)
                .flat_map(|c| c.to_uppercase())
                .collect(),
        }
    }

    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub phone: String,
}

/// 预约状态
///
/// 客户端只会创建 `Scheduled` 或把 `Scheduled` 取消为 `Cancelled`，
/// 其余流转由服务端完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// 界面展示用文案
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "已预约",
            AppointmentStatus::Completed => "已完成",
            AppointmentStatus::Cancelled => "已取消",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient: i64,
    #[serde(default)]
    pub patient_name: String,
    pub doctor: i64,
    #[serde(default)]
    pub doctor_name: String,
    /// ISO 8601 时刻，例如 "2025-03-10T09:00:00"
    pub date: String,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// 只有处于已预约状态的记录才提供取消入口
    pub fn is_cancellable(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

/// 某医生某天的一个可预约时段，随 (doctor, date) 变化即时重算，不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// "HH:MM"
    pub time: String,
    pub is_available: bool,
}

// =========================================================
// 请求 / 响应体 (Wire Bodies)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// 登录 / 注册成功后的凭据响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor: i64,
    /// "YYYY-MM-DDTHH:MM:00"
    pub date: String,
    pub notes: String,
}

/// 档案整表提交（服务端按部分更新处理）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<chrono::NaiveDate>,
    pub medical_history: String,
}

/// 服务端错误响应体，形如 `{"error": "..."}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
        let back: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, AppointmentStatus::Cancelled);
    }

    #[test]
    fn appointment_parses_server_payload() {
        let json = r#"{
            "id": 7,
            "patient": 3,
            "patient_name": "Li Lei",
            "doctor": 2,
            "doctor_name": "Wang",
            "date": "2025-03-10T09:00:00",
            "notes": "",
            "status": "scheduled"
        }"#;
        let apt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(apt.doctor_name, "Wang");
        assert!(apt.is_cancellable());
    }

    #[test]
    fn cancelled_appointment_is_not_cancellable() {
        let json = r#"{"id":1,"patient":1,"doctor":1,"date":"2025-03-10T09:00:00","status":"completed"}"#;
        let apt: Appointment = serde_json::from_str(json).unwrap();
        assert!(!apt.is_cancellable());
        // 缺省字段回退为空
        assert_eq!(apt.patient_name, "");
    }

    #[test]
    fn user_summary_tolerates_missing_optional_fields() {
        let json = r#"{"id":1,"username":"lily","email":"lily@example.com"}"#;
        let user: UserSummary = serde_json::from_str(json).unwrap();
        assert_eq!(user.initials(), "L");
        assert_eq!(user.full_name(), "lily");
        assert!(user.avatar.is_none());
    }

    #[test]
    fn initials_prefer_names_over_username() {
        let json = r#"{"id":1,"username":"lily","email":"e","first_name":"li","last_name":"wang"}"#;
        let user: UserSummary = serde_json::from_str(json).unwrap();
        assert_eq!(user.initials(), "LW");
        assert_eq!(user.full_name(), "li wang");
    }

    #[test]
    fn authorization_header_uses_token_scheme() {
        assert_eq!(authorization_value("abc123"), "Token abc123");
    }

    #[test]
    fn profile_update_omits_empty_birthday() {
        let update = ProfileUpdate {
            first_name: "li".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(!json.contains("birthday"));
    }
}
