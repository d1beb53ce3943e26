//! Outbound email dispatch
//!
//! Handlers never talk to the mail provider directly: they enqueue an
//! [`EmailJob`] on an unbounded channel and move on, so a slow or broken
//! provider cannot stall a signup. One background worker drains the
//! channel and delivers through Resend; without an API key it logs the
//! link it would have sent, which is what development wants anyway.

use resend_rs::{types::CreateEmailBaseOptions, Resend};
use tokio::sync::mpsc;

use booklynn_core::config::AppConfig;

/// A queued outbound email
#[derive(Debug)]
pub enum EmailJob {
    /// Account verification link sent after signup
    Verification { to: String, token: String },
    /// Password reset link
    PasswordReset { to: String, token: String },
}

/// Handle for enqueueing email jobs, cheap to clone
#[derive(Clone)]
pub struct Mailer {
    tx: mpsc::UnboundedSender<EmailJob>,
}

impl Mailer {
    /// Start the delivery worker and return the enqueue handle
    pub fn spawn(config: AppConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(delivery_worker(config, rx));
        Self { tx }
    }

    /// Queue an email for delivery
    ///
    /// Fire-and-forget: the caller learns "enqueued", never "delivered".
    pub fn enqueue(&self, job: EmailJob) {
        if self.tx.send(job).is_err() {
            tracing::error!("mail worker is gone, dropping email job");
        }
    }
}

async fn delivery_worker(config: AppConfig, mut rx: mpsc::UnboundedReceiver<EmailJob>) {
    let client = if config.mail.resend_api_key.is_empty() {
        tracing::warn!("RESEND_API_KEY not set, email delivery disabled (links will be logged)");
        None
    } else {
        Some(Resend::new(&config.mail.resend_api_key))
    };

    while let Some(job) = rx.recv().await {
        let (to, subject, html) = render(&config, &job);

        match &client {
            Some(resend) => {
                let from = format!("{} <{}>", config.mail.from_name, config.mail.from_address);
                let email =
                    CreateEmailBaseOptions::new(from, vec![to.clone()], subject).with_html(&html);

                match resend.emails.send(email).await {
                    Ok(sent) => tracing::info!(%to, id = %sent.id, "email sent"),
                    Err(e) => tracing::error!(%to, error = %e, "email delivery failed"),
                }
            }
            None => tracing::info!(%to, subject, body = %html, "dev mode, email not sent"),
        }
    }
}

/// Build recipient, subject, and body for a job
fn render(config: &AppConfig, job: &EmailJob) -> (String, String, String) {
    match job {
        EmailJob::Verification { to, token } => {
            let link = format!("http://{}/v2/auth/verify/{token}", config.server.domain);
            (
                to.clone(),
                "Verify your email".to_string(),
                format!(
                    "<h1>Verify your Email</h1>\
                     <p>Please click this <a href=\"{link}\">link</a> to verify your email</p>"
                ),
            )
        }
        EmailJob::PasswordReset { to, token } => {
            let link = format!("{}/?token={token}", config.server.frontend_url);
            (
                to.clone(),
                "Reset your password".to_string(),
                format!(
                    "<h1>Reset Your Password</h1>\
                     <p>Please click this <a href=\"{link}\">link</a> to reset your password</p>"
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link_uses_api_domain() {
        let config = AppConfig::default();
        let job = EmailJob::Verification {
            to: "reader@example.com".to_string(),
            token: "abc.def".to_string(),
        };

        let (to, subject, html) = render(&config, &job);
        assert_eq!(to, "reader@example.com");
        assert_eq!(subject, "Verify your email");
        assert!(html.contains("http://localhost:8000/v2/auth/verify/abc.def"));
    }

    #[test]
    fn test_reset_link_targets_console() {
        let config = AppConfig::default();
        let job = EmailJob::PasswordReset {
            to: "reader@example.com".to_string(),
            token: "abc.def".to_string(),
        };

        let (_, _, html) = render(&config, &job);
        assert!(html.contains("http://localhost:8501/?token=abc.def"));
    }

    #[tokio::test]
    async fn test_enqueue_never_blocks() {
        let mailer = Mailer::spawn(AppConfig::default());
        for _ in 0..100 {
            mailer.enqueue(EmailJob::Verification {
                to: "reader@example.com".to_string(),
                token: "t".to_string(),
            });
        }
    }
}
