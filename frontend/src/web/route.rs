//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其守卫属性。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    /// 注册页面
    Register,
    /// 预约列表 (需要认证)
    Appointments,
    /// 新建预约 (需要认证)
    NewAppointment,
    /// 个人档案 (需要认证)
    Profile,
    /// 偏好设置 (需要认证)
    Settings,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" | "/appointments" => Self::Appointments,
            "/appointments/new" => Self::NewAppointment,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/profile" => Self::Profile,
            "/settings" => Self::Settings,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Appointments => "/appointments",
            Self::NewAppointment => "/appointments/new",
            Self::Profile => "/profile",
            Self::Settings => "/settings",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Appointments | Self::NewAppointment | Self::Profile | Self::Settings
        )
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录/注册页）
    pub fn auth_success_redirect() -> Self {
        Self::Appointments
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_resolves_to_appointments() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Appointments);
        assert_eq!(AppRoute::from_path("/appointments"), AppRoute::Appointments);
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert_eq!(AppRoute::from_path("/doctors/42"), AppRoute::NotFound);
    }

    #[test]
    fn protected_routes_require_auth() {
        for route in [
            AppRoute::Appointments,
            AppRoute::NewAppointment,
            AppRoute::Profile,
            AppRoute::Settings,
        ] {
            assert!(route.requires_auth(), "{} 应当需要认证", route);
        }
        assert!(!AppRoute::Login.requires_auth());
        assert!(!AppRoute::Register.requires_auth());
    }

    #[test]
    fn auth_pages_redirect_when_logged_in() {
        assert!(AppRoute::Login.should_redirect_when_authenticated());
        assert!(AppRoute::Register.should_redirect_when_authenticated());
        assert!(!AppRoute::Appointments.should_redirect_when_authenticated());
    }

    #[test]
    fn redirect_targets() {
        assert_eq!(AppRoute::auth_failure_redirect(), AppRoute::Login);
        assert_eq!(AppRoute::auth_success_redirect(), AppRoute::Appointments);
    }
}
