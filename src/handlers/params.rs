use crate::date_utils::is_iso_date;
use crate::error::{AppError, AppResult};
use crate::services::filter::{CategoryFilter, TypeFilter};

/// Query params carrying the `type` and `category` selectors.
///
/// Unlike period and sort tokens, which fall back to their defaults, an
/// unknown selector value is rejected.
pub trait SelectorFilterable {
    fn type_param(&self) -> Option<&String>;
    fn category_param(&self) -> Option<&String>;

    fn resolve_type(&self) -> AppResult<TypeFilter> {
        match self.type_param() {
            None => Ok(TypeFilter::All),
            Some(s) => s
                .parse()
                .map_err(|_| AppError::Validation(format!("Unknown transaction type: {s}"))),
        }
    }

    fn resolve_category(&self) -> AppResult<CategoryFilter> {
        match self.category_param() {
            None => Ok(CategoryFilter::All),
            Some(s) => s
                .parse()
                .map_err(|_| AppError::Validation(format!("Unknown category: {s}"))),
        }
    }
}

/// Validate an optional `YYYY-MM-DD` bound, treating an empty value as absent.
pub fn date_bound(name: &str, value: Option<&String>) -> AppResult<Option<String>> {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if is_iso_date(v) => Ok(Some(v.to_string())),
        Some(v) => Err(AppError::Validation(format!(
            "{name} must be YYYY-MM-DD: {v}"
        ))),
    }
}
