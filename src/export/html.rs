use std::fmt::Write;

use crate::users::repo_types::User;

const STYLESHEET_HREF: &str = "styles.css";

/// Table of `ID, Username, Age`, one row per user, handed to the PDF renderer.
pub fn render_table_html(users: &[User]) -> String {
    let mut html = String::with_capacity(256 + users.len() * 96);
    html.push_str("<html><head><meta charset='utf-8'>");
    let _ = write!(
        html,
        "<link rel='stylesheet' type='text/css' href='{STYLESHEET_HREF}'>"
    );
    html.push_str("</head><body>");
    html.push_str("<table border='1' cellpadding='5' cellspacing='0'>");
    html.push_str("<tr><th>ID</th><th>Username</th><th>Age</th></tr>");

    for user in users {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            user.id,
            escape(&user.username),
            user.age
        );
    }

    html.push_str("</table></body></html>");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
