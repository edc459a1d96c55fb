//! Shared email content templates
//!
//! Canonical content generators for invitation and join-request emails,
//! used by every dispatcher implementation.

/// Generate plain-text body for an organization invitation email.
pub fn organization_invitation_text(
    inviter_name: &str,
    organization_name: &str,
    invitation_url: &str,
) -> String {
    format!(
        "Hi there!\n\n\
        {} has invited you to join the organization '{}'.\n\n\
        Click the link below to accept the invitation:\n\
        {}\n\n\
        If you don't have a Coterie account, you'll be prompted to create one.\n\n\
        Thanks,\n\
        The Coterie Team",
        inviter_name, organization_name, invitation_url
    )
}

/// Generate styled HTML body for an organization invitation email.
pub fn organization_invitation_html(
    inviter_name: &str,
    organization_name: &str,
    invitation_url: &str,
) -> String {
    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #007cba;">You're invited to join {organization_name}!</h2>

                    <p>Hi there!</p>

                    <p><strong>{inviter_name}</strong> has invited you to join the organization '<strong>{organization_name}</strong>'.</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{invitation_url}"
                           style="background-color: #007cba; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block; font-weight: bold;">
                            Accept Invitation
                        </a>
                    </div>

                    <p>Or copy and paste this link in your browser:</p>
                    <p style="background-color: #f5f5f5; padding: 10px; border-radius: 4px; word-break: break-all;">
                        <a href="{invitation_url}">{invitation_url}</a>
                    </p>

                    <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">

                    <p style="color: #666; font-size: 12px;">
                        If you don't have a Coterie account, you'll be prompted to create one.<br>
                        Thanks, The Coterie Team
                    </p>
                </div>
            </body>
            </html>
            "#,
        organization_name = organization_name,
        inviter_name = inviter_name,
        invitation_url = invitation_url
    )
}

/// Generate plain-text body for a join-request notice sent to org admins.
pub fn join_request_text(
    requester_name: &str,
    organization_name: &str,
    review_url: &str,
) -> String {
    format!(
        "Hi there!\n\n\
        {} has requested to join the organization '{}'.\n\n\
        Review the request here:\n\
        {}\n\n\
        Thanks,\n\
        The Coterie Team",
        requester_name, organization_name, review_url
    )
}

/// Generate HTML body for a join-request notice sent to org admins.
pub fn join_request_html(
    requester_name: &str,
    organization_name: &str,
    review_url: &str,
) -> String {
    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #007cba;">New request to join {organization_name}</h2>

                    <p><strong>{requester_name}</strong> has requested to join '<strong>{organization_name}</strong>'.</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{review_url}"
                           style="background-color: #007cba; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block; font-weight: bold;">
                            Review Request
                        </a>
                    </div>

                    <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">

                    <p style="color: #666; font-size: 12px;">Thanks, The Coterie Team</p>
                </div>
            </body>
            </html>
            "#,
        organization_name = organization_name,
        requester_name = requester_name,
        review_url = review_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_invitation_text_contains_all_fields() {
        let text = organization_invitation_text("Alice", "MuckRake", "https://example.com/accept");
        assert!(text.contains("Alice"));
        assert!(text.contains("MuckRake"));
        assert!(text.contains("https://example.com/accept"));
    }

    #[test]
    fn test_organization_invitation_html_contains_all_fields() {
        let html = organization_invitation_html("Alice", "MuckRake", "https://example.com/accept");
        assert!(html.contains("Alice"));
        assert!(html.contains("MuckRake"));
        assert!(html.contains("https://example.com/accept"));
    }

    #[test]
    fn test_join_request_text_contains_all_fields() {
        let text = join_request_text("bob", "MuckRake", "https://example.com/review");
        assert!(text.contains("bob"));
        assert!(text.contains("MuckRake"));
        assert!(text.contains("https://example.com/review"));
    }

    #[test]
    fn test_join_request_html_contains_all_fields() {
        let html = join_request_html("bob", "MuckRake", "https://example.com/review");
        assert!(html.contains("bob"));
        assert!(html.contains("MuckRake"));
        assert!(html.contains("https://example.com/review"));
    }
}
