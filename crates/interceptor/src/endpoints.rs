//! Backend API paths, relative to the API base URL

/// Default API base: the backend is mounted under `/api` on the same origin.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

pub const PUBLIC_KEY: &str = "/public-key/";
pub const LOGIN: &str = "/login/";
pub const REGISTER: &str = "/register/";
pub const LOGOUT: &str = "/logout/";
pub const USER_INFO: &str = "/user/info/";
pub const ADMIN_LOGIN: &str = "/admin/login/";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard/";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestScope;

    #[test]
    fn admin_endpoints_are_admin_scoped() {
        assert_eq!(RequestScope::of_url(ADMIN_LOGIN), RequestScope::Admin);
        assert_eq!(RequestScope::of_url(ADMIN_DASHBOARD), RequestScope::Admin);
    }

    #[test]
    fn user_endpoints_are_user_scoped() {
        for url in [PUBLIC_KEY, LOGIN, REGISTER, LOGOUT, USER_INFO] {
            assert_eq!(RequestScope::of_url(url), RequestScope::User, "{url}");
        }
    }
}
