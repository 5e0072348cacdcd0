//! Minimal standalone HTML rendering for the `/p/{id}` view.

pub fn paste_page(id: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Paste {id}</title>
    <style>
        body {{ font-family: monospace; margin: 20px; }}
        pre {{ background: #f4f4f4; padding: 15px; border-radius: 5px; white-space: pre-wrap; }}
        .meta {{ color: #666; margin-bottom: 20px; }}
    </style>
</head>
<body>
    <div class="meta">Paste ID: {id}</div>
    <pre>{content}</pre>
</body>
</html>
"#,
        id = escape(id),
        content = escape(content),
    )
}

pub fn not_found_page() -> String {
    "<!DOCTYPE html>\n<html>\n<head><title>Not Found</title></head>\n<body><h1>Paste not \
     found</h1></body>\n</html>\n"
        .to_string()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
