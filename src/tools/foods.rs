//! Food catalog MCP Tools

use serde::Serialize;

use crate::catalog::{self, CatalogFood};

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub query: String,
    pub foods: Vec<&'static CatalogFood>,
}

/// Search the built-in food catalog by name
pub fn search_foods(query: &str, limit: i64) -> Result<SearchFoodsResponse, String> {
    if limit <= 0 {
        return Err(format!("limit must be positive, got {}", limit));
    }

    Ok(SearchFoodsResponse {
        query: query.to_string(),
        foods: catalog::search(query, limit as usize),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_foods() {
        let response = search_foods("egg", 20).unwrap();
        assert_eq!(response.foods.len(), 2);
        assert!(search_foods("egg", 0).is_err());
    }
}
