use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the password reset email containing the one-time reset link.
    pub async fn send_reset_email(&self, to_email: &str, username: &str, token: &str, frontend_url: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping password reset email to {}", to_email);
            return Ok(());
        }

        let reset_link = reset_link(frontend_url, token);
        let subject = "Reset your Crabbit password";
        let html_body = self.reset_email_html(username, &reset_link);
        let text_body = self.reset_email_text(username, &reset_link);

        self.send(to_email, subject, &html_body, &text_body).await
    }

    fn reset_email_html(&self, username: &str, reset_link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Reset your Crabbit password</title></head>
<body>
  <p>Hi {username},</p>
  <p>We received a request to reset your Crabbit password.</p>
  <p><a href="{reset_link}">Click to reset your password.</a></p>
  <p>This link expires in 1 hour. If you did not request this, you can safely ignore this message.</p>
  <p>Crabbit</p>
</body>
</html>
"#
        )
    }

    fn reset_email_text(&self, username: &str, reset_link: &str) -> String {
        format!(
            r#"Hi {username},

We received a request to reset your Crabbit password.

Reset it using the link below:
{reset_link}

This link expires in 1 hour. If you did not request this, you can safely ignore this message.

Crabbit
"#
        )
    }

    async fn send(&self, to_email: &str, subject: &str, html_body: &str, text_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_address)
                    .parse()
                    .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email.parse().map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::email(format!("Failed to build email: {}", e)))?;

        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::email(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        // SmtpTransport::send blocks; keep it off the async workers.
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::email(format!("Failed to spawn email sending task: {}", e)))?;

        result.map_err(|e| AppError::email(format!("Failed to send email: {}", e)))?;

        tracing::info!("Password reset email sent to {}", to_email);
        Ok(())
    }
}

/// Reset links point at the frontend change-password page:
/// `<frontend>/change-password/<token>`.
pub fn reset_link(frontend_url: &str, token: &str) -> String {
    format!("{}/change-password/{}", frontend_url.trim_end_matches('/'), token)
}
