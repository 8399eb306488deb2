use super::DownloadLinkEmail;

pub const DOWNLOAD_LINK_SUBJECT: &str = "Your ResumePro Download Link";
pub const DEFAULT_TEMPLATE_NAME: &str = "Professional Resume";

pub fn download_url(frontend_url: &str, token: &str) -> String {
    format!("{}/download/{}", frontend_url.trim_end_matches('/'), token)
}

/// Escapes the characters that matter inside HTML text and attribute values.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

pub fn render_html(email: &DownloadLinkEmail) -> String {
    let url = escape_html(&email.download_url);
    let template = escape_html(&email.template_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #1f2937; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #2563eb;">Thank you for your purchase!</h1>
  <p>Your <strong>{template}</strong> resume is ready to download.</p>
  <p>
    <a href="{url}" style="display: inline-block; padding: 12px 24px; background: #2563eb; color: #ffffff; text-decoration: none; border-radius: 6px;">Download Your Resume</a>
  </p>
  <p>Or copy this link into your browser:<br><a href="{url}">{url}</a></p>
  <p>This link stays valid for {days} days and can be used as many times as you need.</p>
  <p style="color: #6b7280; font-size: 12px;">If you did not make this purchase, you can ignore this email.</p>
</body>
</html>"#,
        days = email.validity_days,
    )
}

pub fn render_text(email: &DownloadLinkEmail) -> String {
    format!(
        "Thank you for your purchase!\n\n\
         Your {template} resume is ready to download:\n\
         {url}\n\n\
         This link stays valid for {days} days and can be used as many times as you need.\n\n\
         If you did not make this purchase, you can ignore this email.\n",
        template = email.template_name,
        url = email.download_url,
        days = email.validity_days,
    )
}
