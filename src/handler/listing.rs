//! Directory listing renderer

use super::error::ServeError;
use super::html;
use super::outcome::Outcome;
use super::resolve::RequestContext;
use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::ffi::OsString;
use std::path::Path;
use tokio::fs;

/// Characters left as-is in listing links: unreserved URL characters and `/`
const HREF_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const LISTING_PAGE_START: &str = r#"<html lang="en">
<head>
    <meta charset="UTF-8">
    <title></title>
</head>
<body>
<ul>
"#;

const LISTING_PAGE_END: &str = "</ul>
</body>
</html>
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub sort: bool,
    pub escape: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            sort: true,
            escape: true,
        }
    }
}

/// Render an HTML list of the visible entries of the requested directory.
///
/// Links are built from raw name bytes, so names that are not UTF-8 still link
/// back to the file; only their visible text is lossy.
pub async fn list(ctx: &RequestContext, options: ListingOptions) -> Outcome {
    let names = match visible_entries(&ctx.resolved_path).await {
        Ok(mut names) => {
            if options.sort {
                names.sort();
            }
            names
        }
        Err(source) => {
            return ServeError::List {
                path: ctx.url_path.clone(),
                source,
            }
            .into();
        }
    };

    Outcome::html(render(&ctx.url_bytes, &names, options.escape))
}

/// Entry names not starting with `.`, in enumeration order
async fn visible_entries(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !name.as_encoded_bytes().starts_with(b".") {
            names.push(name);
        }
    }

    Ok(names)
}

fn render(url_bytes: &[u8], names: &[OsString], escape: bool) -> String {
    let mut page = String::from(LISTING_PAGE_START);
    for name in names {
        let joined = join_url(url_bytes, name.as_encoded_bytes());
        let href = percent_encode(&joined, HREF_ENCODE_SET);
        let display = name.to_string_lossy();
        let text = if escape {
            html::escape(&display)
        } else {
            display.into_owned()
        };
        page.push_str(&format!("<li><a href=\"{href}\">{text}</a></li>\n"));
    }
    page.push_str(LISTING_PAGE_END);
    page
}

fn join_url(base: &[u8], name: &[u8]) -> Vec<u8> {
    let mut url = base.to_vec();
    if !url.ends_with(b"/") {
        url.push(b'/');
    }
    url.extend_from_slice(name);
    url
}
