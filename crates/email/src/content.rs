//! Shared email content
//!
//! Used by both the SES and mock services so captured test emails match
//! what production sends.

use uuid::Uuid;

use crate::InvitationEmail;

/// Link the invitee follows to accept
pub fn invitation_url(app_base_url: &str, invitation_id: Uuid) -> String {
    format!(
        "{}/invitations/{}/accept",
        app_base_url.trim_end_matches('/'),
        invitation_id
    )
}

pub fn staff_invitation_subject(role_name: &str) -> String {
    format!("You're invited to join PropDesk as {}", role_name)
}

fn property_line(titles: &[String]) -> Option<String> {
    if titles.is_empty() {
        None
    } else {
        Some(format!("You will have access to {}.", titles.join(", ")))
    }
}

pub fn staff_invitation_text(invitation: &InvitationEmail<'_>, invitation_url: &str) -> String {
    let mut body = format!(
        "Hi there!\n\n{} has invited you to join their property team as {}.\n",
        invitation.inviter_name, invitation.role_name
    );
    if let Some(line) = property_line(invitation.property_titles) {
        body.push_str(&line);
        body.push('\n');
    }
    body.push_str(&format!(
        "\nAccept the invitation here:\n{}\n\n\
        This invitation expires in {} days.\n\n\
        Thanks,\nThe PropDesk Team",
        invitation_url, invitation.expires_in_days
    ));
    body
}

pub fn staff_invitation_html(invitation: &InvitationEmail<'_>, invitation_url: &str) -> String {
    let properties = property_line(invitation.property_titles)
        .map(|line| format!("<p>{}</p>", line))
        .unwrap_or_default();

    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2563eb;">You're invited to PropDesk</h2>

                    <p><strong>{inviter_name}</strong> has invited you to join their property team as <strong>{role_name}</strong>.</p>
                    {properties}

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{invitation_url}"
                           style="background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block; font-weight: bold;">
                            Accept Invitation
                        </a>
                    </div>

                    <p>Or copy and paste this link in your browser:</p>
                    <p style="background-color: #f5f5f5; padding: 10px; border-radius: 4px; word-break: break-all;">
                        <a href="{invitation_url}">{invitation_url}</a>
                    </p>

                    <p style="color: #666; font-size: 14px;">
                        <em>This invitation expires in {expires_in_days} days.</em>
                    </p>
                </div>
            </body>
            </html>
            "#,
        inviter_name = invitation.inviter_name,
        role_name = invitation.role_name,
        properties = properties,
        invitation_url = invitation_url,
        expires_in_days = invitation.expires_in_days,
    )
}
