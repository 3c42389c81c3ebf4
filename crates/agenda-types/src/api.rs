use serde::{Deserialize, Serialize};

// -- Token claims --

/// Identity carried by a bearer token. Inserted into request extensions by the
/// auth middleware once the token has been verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Returned by both register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password: Option<String>,
}

// -- Envelopes --

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Listing response for collections that still answer unpaginated requests
/// with a bare array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    All(Vec<T>),
    Paged(Page<T>),
}

// -- Courses --

#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    pub name: Option<String>,
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub teacher: Option<String>,
    pub color: Option<String>,
}

// -- Tasks --

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub description: Option<String>,
}

// -- Contacts --

/// Tags arrive either already comma-joined or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    Joined(String),
    List(Vec<String>),
}

impl Tags {
    pub fn joined(self) -> String {
        match self {
            Tags::Joined(s) => s,
            Tags::List(list) => list
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub identity: Option<String>,
    pub tags: Option<Tags>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
}

// -- Thoughts --

#[derive(Debug, Deserialize)]
pub struct ThoughtRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub related_contact_id: Option<i64>,
}
