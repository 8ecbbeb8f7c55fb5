//! HTML bodies for outgoing email. Inline styles only; most clients strip
//! `<style>` blocks.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub html: String,
}

/// A generic admin notification.
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub title: String,
    /// Already-escaped HTML fragment
    pub message_html: String,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
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

fn base_layout(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Nhung Consultancy</title>
</head>
<body style="margin: 0; padding: 0; background-color: #f9fafb; font-family: Arial, sans-serif;">
  <div style="max-width: 600px; margin: 0 auto; background-color: white; padding: 20px;">
    {content}
    <hr style="margin: 30px 0; border: none; border-top: 1px solid #e5e7eb;">
    <p style="color: #6b7280; font-size: 12px; text-align: center; margin: 0;">
      Nhung Consultancy Admin System
    </p>
  </div>
</body>
</html>"#
    )
}

fn button(url: &str, label: &str) -> String {
    format!(
        r#"<div style="text-align: center; margin: 30px 0;">
      <a href="{url}" style="background-color: #2563eb; color: white; padding: 14px 28px; text-decoration: none; border-radius: 8px; display: inline-block; font-weight: 500; font-size: 16px;">{label}</a>
    </div>"#,
        url = escape_html(url),
        label = escape_html(label),
    )
}

pub fn password_reset(reset_url: &str, user_name: Option<&str>) -> EmailTemplate {
    let name = escape_html(user_name.unwrap_or("User"));
    let link = escape_html(reset_url);
    let content = format!(
        r#"<div style="text-align: center; margin-bottom: 30px;">
      <h2 style="color: #2563eb; margin: 0; font-size: 24px;">Password Reset Request</h2>
    </div>
    <div style="color: #374151; line-height: 1.6;">
      <p>Hello {name},</p>
      <p>You requested a password reset for your Nhung Consultancy admin account.</p>
      {button}
      <div style="background-color: #fef3c7; border: 1px solid #f59e0b; border-radius: 8px; padding: 16px; margin: 20px 0;">
        <p style="margin: 0 0 10px 0; font-weight: 600; color: #92400e;">Important:</p>
        <ul style="margin: 0; padding-left: 20px; color: #92400e;">
          <li>This link expires in 1 hour</li>
          <li>It can only be used once</li>
          <li>If you didn't request this reset, please ignore this email</li>
        </ul>
      </div>
      <p style="color: #6b7280; font-size: 14px;">
        If the button doesn't work, copy and paste this link into your browser:<br>
        <a href="{link}" style="color: #2563eb; word-break: break-all;">{link}</a>
      </p>
    </div>"#,
        button = button(reset_url, "Reset Password"),
    );

    EmailTemplate {
        subject: "Reset your password - Nhung Consultancy".to_string(),
        html: base_layout(&content),
    }
}

pub fn notification(notification: &Notification) -> EmailTemplate {
    let action = match &notification.action_url {
        Some(url) => button(
            url,
            notification.action_text.as_deref().unwrap_or("View Details"),
        ),
        None => String::new(),
    };
    let content = format!(
        r#"<div style="text-align: center; margin-bottom: 30px;">
      <h2 style="color: #2563eb; margin: 0; font-size: 24px;">{title}</h2>
    </div>
    <div style="color: #374151; line-height: 1.6;">
      <p>{message}</p>
      {action}
    </div>"#,
        title = escape_html(&notification.title),
        message = notification.message_html,
    );

    EmailTemplate {
        subject: notification.title.clone(),
        html: base_layout(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_password_reset_contains_link_twice_and_expiry() {
        let template = password_reset("https://site/reset-password?token=a&b", Some("Nhung"));
        assert_eq!(template.subject, "Reset your password - Nhung Consultancy");
        assert_eq!(
            template
                .html
                .matches("https://site/reset-password?token=a&amp;b")
                .count(),
            3
        );
        assert!(template.html.contains("Hello Nhung,"));
        assert!(template.html.contains("expires in 1 hour"));
        assert!(template.html.contains("Nhung Consultancy Admin System"));
    }

    #[test]
    fn test_notification_action_is_optional() {
        let mut note = Notification {
            title: "New <message>".into(),
            message_html: "<strong>Hi</strong>".into(),
            action_url: None,
            action_text: None,
        };
        let plain = notification(&note);
        assert_eq!(plain.subject, "New <message>");
        assert!(plain.html.contains("New &lt;message&gt;"));
        assert!(plain.html.contains("<strong>Hi</strong>"));
        assert!(!plain.html.contains("<a href"));

        note.action_url = Some("mailto:lan@example.org".into());
        note.action_text = Some("Reply".into());
        let with_action = notification(&note);
        assert!(with_action.html.contains(r#"href="mailto:lan@example.org""#));
        assert!(with_action.html.contains(">Reply</a>"));
    }
}
