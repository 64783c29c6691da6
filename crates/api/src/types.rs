//! API response types

use serde::Serialize;

/// Success envelope: `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always true
    pub success: bool,
    /// Response data
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new API response
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// List envelope with a count
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    /// Always true
    pub success: bool,
    /// Number of items
    pub count: usize,
    /// Items
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Create a new list response
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Body for endpoints that only acknowledge
#[derive(Debug, Serialize)]
pub struct Empty {}
