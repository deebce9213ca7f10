//! 联系表单
//!
//! 仅做客户端校验与模拟发送，消息不会离开浏览器。

use std::time::Duration;

use litreview_shared::validation::{is_blank, is_valid_email};

/// 模拟发送耗时
pub const SIMULATED_SEND_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Please fill out all required fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

pub fn validate_contact(msg: &ContactMessage) -> Result<(), ContactError> {
    let fields = [&msg.name, &msg.email, &msg.subject, &msg.message];
    if fields.iter().any(|f| is_blank(f)) {
        return Err(ContactError::MissingFields);
    }
    if !is_valid_email(&msg.email) {
        return Err(ContactError::InvalidEmail);
    }
    Ok(())
}

/// 表单下方的反馈信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactFeedback {
    Pending,
    Error(ContactError),
    Sent,
}

impl ContactFeedback {
    pub fn text(&self) -> String {
        match self {
            ContactFeedback::Pending => "Sending...".to_string(),
            ContactFeedback::Error(e) => e.to_string(),
            ContactFeedback::Sent => {
                "Thanks! Your message has been sent. We will get back to you shortly.".to_string()
            }
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ContactFeedback::Pending => "text-info",
            ContactFeedback::Error(_) => "text-error",
            ContactFeedback::Sent => "text-success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Pricing".into(),
            message: "Do you offer student discounts?".into(),
        }
    }

    #[test]
    fn test_valid_message() {
        assert_eq!(validate_contact(&message()), Ok(()));
    }

    #[test]
    fn test_every_field_is_required() {
        for blank in 0..4 {
            let mut msg = message();
            let field = match blank {
                0 => &mut msg.name,
                1 => &mut msg.email,
                2 => &mut msg.subject,
                _ => &mut msg.message,
            };
            *field = "  ".into();
            assert_eq!(validate_contact(&msg), Err(ContactError::MissingFields));
        }
    }

    #[test]
    fn test_email_shape() {
        let mut msg = message();
        msg.email = "ada@example".into();
        assert_eq!(validate_contact(&msg), Err(ContactError::InvalidEmail));
        assert_eq!(
            ContactFeedback::Error(ContactError::InvalidEmail).text(),
            "Please enter a valid email address."
        );
    }

    #[test]
    fn test_feedback_text() {
        assert_eq!(ContactFeedback::Pending.text(), "Sending...");
        assert!(ContactFeedback::Sent.text().starts_with("Thanks!"));
    }
}
