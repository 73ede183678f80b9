//! Fixed SQL run by the two functions. Literal text only, no parameters.

/// Table definition applied over a direct driver connection.
pub const CREATE_USER_TABLE: &str = "CREATE TABLE IF NOT EXISTS user (\
    id INT AUTO_INCREMENT PRIMARY KEY, \
    username VARCHAR(255) NOT NULL UNIQUE\
)";

/// Table definition sent through the data API.
pub const CREATE_NAMED_USER_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS user (id INT AUTO_INCREMENT PRIMARY KEY, name VARCHAR(255));";

/// Demo row inserted on every proxy invocation.
pub const INSERT_DEMO_USER: &str = "INSERT INTO user (name) VALUES ('John Doe')";

pub fn driver_statements() -> &'static [&'static str] {
    &[CREATE_USER_TABLE]
}

/// Statements in execution order. The insert runs unconditionally, so every
/// invocation adds one row.
pub fn proxy_statements() -> &'static [&'static str] {
    &[CREATE_NAMED_USER_TABLE, INSERT_DEMO_USER]
}
