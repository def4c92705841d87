pub mod connection;
pub use connection::Connection;

pub mod results;
pub use results::QueryError;

pub mod schema;

pub mod members;
pub mod trainers;
pub mod payments;
pub mod attendance;

/// Substring pattern for `LIKE ... ESCAPE '\'`, matching
/// `%` and `_` in the search text literally.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
