//! Error page rendering

use super::html;

/// Status used for every failed request
pub const ERROR_STATUS: u16 = 500;

/// Render the error page for `url_path`; both values are HTML-escaped
pub fn render(url_path: &str, message: &str) -> (u16, String) {
    let page = format!(
        r#"<html lang="en">
    <head>
        <meta charset="UTF-8">
        <title></title>
    </head>
    <body>
        <h1>Error Accessing {path} </h1>
        <p>{msg}</p>
    </body>
</html>
"#,
        path = html::escape(url_path),
        msg = html::escape(message),
    );
    (ERROR_STATUS, page)
}
