//! Password reset and invitation e-mails.

use hrdesk_core::result::AppResult;
use hrdesk_core::traits::OutboundEmail;
use hrdesk_core::types::DeepLink;

/// Build the reset e-mail for `to` carrying `raw_token`.
pub fn reset_email(
    to: &str,
    raw_token: &str,
    link_base: &str,
    ttl_minutes: u64,
) -> AppResult<OutboundEmail> {
    let link = DeepLink::ResetPassword {
        token: raw_token.to_string(),
    }
    .to_url(link_base)?;

    Ok(OutboundEmail {
        to: to.to_string(),
        subject: "Reset your HRDesk password".to_string(),
        html: format!(
            "<p>We received a request to reset your HRDesk password.</p>\
             <p><a href=\"{link}\">Choose a new password</a></p>\
             <p>The link expires in {ttl_minutes} minutes and can be used once. \
             If you did not ask for this, you can ignore this e-mail.</p>"
        ),
        text: format!(
            "We received a request to reset your HRDesk password.\n\n\
             Choose a new password: {link}\n\n\
             The link expires in {ttl_minutes} minutes and can be used once. \
             If you did not ask for this, you can ignore this e-mail.\n"
        ),
    })
}

/// Build the invitation e-mail for a newly created employee account.
pub fn invitation_email(
    to: &str,
    company_name: &str,
    raw_token: &str,
    link_base: &str,
) -> AppResult<OutboundEmail> {
    let link = DeepLink::ResetPassword {
        token: raw_token.to_string(),
    }
    .to_url(link_base)?;

    Ok(OutboundEmail {
        to: to.to_string(),
        subject: format!("You have been invited to {company_name} on HRDesk"),
        html: format!(
            "<p>{company_name} has created an HRDesk account for you.</p>\
             <p><a href=\"{link}\">Set your password</a></p>"
        ),
        text: format!(
            "{company_name} has created an HRDesk account for you.\n\n\
             Set your password: {link}\n"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_email_contains_link() {
        let mail = reset_email("kari@acme.no", "deadbeef", "hrdesk://app/", 60).unwrap();
        assert_eq!(mail.to, "kari@acme.no");
        assert!(mail.text.contains("hrdesk://app/reset-password?token=deadbeef"));
        assert!(mail.html.contains("hrdesk://app/reset-password?token=deadbeef"));
        assert!(mail.text.contains("60 minutes"));
    }
}
