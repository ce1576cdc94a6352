use std::fmt::Write;

use crate::types::PackageSummary;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the report rows as a standalone HTML page.
pub fn render_html(packages: &[PackageSummary], show_sizes: bool) -> String {
    let mut rows = String::new();
    for package in packages {
        let _ = write!(
            rows,
            "      <tr>\n        <td>{}</td>\n        <td>{}</td>\n        <td>{}</td>\n",
            escape_html(&package.name),
            package.count,
            package.shared
        );
        if show_sizes {
            let size = package.child_size.map(|b| format!("{} bytes", b)).unwrap_or_default();
            let _ = writeln!(rows, "        <td>{}</td>", size);
        }
        rows.push_str("      </tr>\n");
    }

    let size_header = if show_sizes {
        "\n        <th>Children size gzipped (unique tree of dependencies for this package)</th>"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>webdepview</title>
  <style>
  table, th, td {{
    border: 1px solid black;
    border-collapse: collapse;
    padding: 5px;
  }}
  </style>
</head>
<body>
  <h1>webdepview</h1>
  <table>
    <thead>
      <tr>
        <th>Name</th>
        <th>Count (unique tree of dependencies for this package)</th>
        <th>Shared (shared dependencies with other packages)</th>{size_header}
      </tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</body>
</html>
"#
    )
}
