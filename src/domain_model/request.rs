use crate::domain_model::BearerToken;
use serde::de::DeserializeOwned;
use std::fmt;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Replaces any existing header with the same (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn with_bearer(mut self, token: &BearerToken) -> Self {
        self.set_header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        self
    }

    pub fn bearer(&self) -> Option<BearerToken> {
        self.header(AUTHORIZATION)
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| BearerToken(t.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_bearer_replaces_existing_header() {
        let req = ApiRequest::get("/api/teams")
            .with_header("authorization", "Bearer old")
            .with_bearer(&BearerToken("new".to_string()));
        let auth: Vec<_> = req
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(AUTHORIZATION))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(req.header("Authorization"), Some("Bearer new"));
        assert_eq!(req.bearer(), Some(BearerToken("new".to_string())));
    }

    #[test]
    fn test_bearer_absent() {
        let req = ApiRequest::get("/api/teams").with_header("Authorization", "Basic abc");
        assert_eq!(req.bearer(), None);
    }

    #[test]
    fn test_response_json() {
        let resp = ApiResponse::new(200, r#"{"name":"Flamengo"}"#);
        assert!(resp.is_success());
        let v: serde_json::Value = resp.json().unwrap();
        assert_eq!(v["name"], "Flamengo");
        assert!(!ApiResponse::new(401, "").is_success());
    }
}
